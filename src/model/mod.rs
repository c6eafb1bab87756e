pub mod employee;
pub mod marking;
pub mod monthly_stat;
pub mod role;
