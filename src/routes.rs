use crate::{
    api::{employee, marking, stats},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employee")
                    .service(
                        web::resource("/mark-time").route(web::post().to(marking::mark_time)),
                    )
                    .service(
                        web::resource("/today-markings")
                            .route(web::get().to(marking::today_markings)),
                    )
                    .service(
                        web::resource("/monthly-stats")
                            .route(web::get().to(stats::monthly_stats)),
                    )
                    .service(web::resource("/stats").route(web::get().to(stats::stats))),
            )
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/employees").route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/update-rate")
                            .route(web::post().to(employee::update_rate)),
                    )
                    .service(
                        web::resource("/markings").route(web::get().to(marking::list_markings)),
                    ),
            ),
    );
}
