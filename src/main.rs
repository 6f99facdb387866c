mod models;
mod routes;
mod db;
mod services;
mod utils;
mod middleware;
mod error;
use actix_web::{App, HttpServer, web};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    println!("🔌 Connecting to database...");
    let db = db::establish_connection()
        .await
        .expect("Failed to connect to database");
    println!("✅ Database connected!");

    if let Err(e) = services::bootstrap::ensure_admin_account(&db).await {
        eprintln!("⚠️  Admin bootstrap failed: {}", e);
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    println!("🚀 Starting server on http://{}:{}", host, port);

    let db_data = web::Data::new(db);

    HttpServer::new(move || {
        App::new()
            .app_data(db_data.clone())
            .configure(routes::configure_routes)
    })
        .bind((host.as_str(), port))?
        .run()
        .await
}
