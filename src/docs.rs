use crate::api::employee::{EmployeeOverview, UpdateRateReq};
use crate::api::marking::{AdminMarking, MarkTimeReq, MarkingFilter, TodayMarking};
use crate::model::marking::MarkingType;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Relógio de Ponto API",
        version = "1.0.0",
        description = r#"
## Relógio de Ponto

Backend for an employee time-clock system.

### 🔹 Key Features
- **Marcações**
  - Entrada/saida markings with one-per-day sequencing and geolocation
- **Estatísticas**
  - Daily, weekly and monthly worked-hours summaries with overtime
- **Admin**
  - Employee overview with month totals and pay, hourly rate updates,
    and a filterable marking browser

### 🔐 Security
All endpoints except login are protected with **JWT Bearer authentication**.
Admin endpoints additionally require the admin role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::marking::mark_time,
        crate::api::marking::today_markings,
        crate::api::marking::list_markings,

        crate::api::stats::monthly_stats,
        crate::api::stats::stats,

        crate::api::employee::list_employees,
        crate::api::employee::update_rate,
    ),
    components(
        schemas(
            MarkingType,
            MarkTimeReq,
            TodayMarking,
            MarkingFilter,
            AdminMarking,
            EmployeeOverview,
            UpdateRateReq
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Marcações", description = "Clock-in/clock-out marking APIs"),
        (name = "Estatísticas", description = "Worked-hours summary APIs"),
        (name = "Admin", description = "Administrator APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
