mod handlers;
mod services;
mod utils;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use services::platforms::PlatformClients;
use utils::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file FIRST before anything else
    dotenv::dotenv().ok();

    // Initialize logger with default level if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=================================================");
    println!("🚀 Stats Backend Server");
    println!("=================================================");

    let config = Config::from_env().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Failed to load configuration: {:#}", e),
        )
    })?;
    let host = config.host.clone();
    let port = config.port;

    println!("📝 Configuration loaded:");
    println!("   - Host: {}", host);
    println!("   - Port: {}", port);
    println!(
        "   - GitHub tokens: {} ({:?})",
        config.github_tokens.len(),
        config.token_strategy
    );
    println!("   - Contributions from: {}", config.contribution_start_year);
    println!("   - Public dir: {}", config.public_dir);
    println!(
        "   - Log level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    );

    if config.github_tokens.is_empty() {
        log::warn!("No GitHub token configured; /api/git endpoints will fail");
    }

    let clients = PlatformClients::from_config(&config).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to build HTTP client: {}", e),
        )
    })?;
    let github = web::Data::new(clients.github);
    let leetcode = web::Data::new(clients.leetcode);
    let duolingo = web::Data::new(clients.duolingo);

    println!("🌐 Starting HTTP server at http://{}:{}", host, port);
    println!("📍 Available endpoints:");
    for endpoint in [
        "/api/git/user",
        "/api/git/repos",
        "/api/git/repos_count",
        "/api/git/langs",
        "/api/git/commit",
        "/api/git/streak",
        "/api/duo/user",
        "/api/leet/user",
    ] {
        println!("   - GET  http://{}:{}{}?user=<name>", host, port, endpoint);
    }
    println!("   - GET  http://{}:{}/api/doc/", host, port);
    println!("=================================================");

    log::info!("Server started at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(github.clone())
            .app_data(leetcode.clone())
            .app_data(duolingo.clone())
            .wrap(Logger::default())
            // Read-only public API, embeddable from anywhere
            .wrap(Cors::permissive())
            .configure(handlers::configure)
            // Static files last so the API routes take precedence
            .service(Files::new("/", config.public_dir.clone()).index_file("index.html"))
    })
    .bind((host, port))?
    .run()
    .await
}
