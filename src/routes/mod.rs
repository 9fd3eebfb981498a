pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register).service(auth::token).service(
        web::scope("/tasks")
            .wrap(AuthMiddleware)
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
