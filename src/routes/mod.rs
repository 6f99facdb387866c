pub mod health;
pub mod auth;
pub mod baskets;
pub mod orders;
pub mod dashboard;
pub mod admin;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(baskets::basket_routes)
            .configure(orders::order_routes)
            .configure(dashboard::dashboard_routes)
            .configure(admin::admin_routes)
    );
}
