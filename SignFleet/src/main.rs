use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use rust_embed::RustEmbed;
use signdevices::FleetExt;
use signimages::ImagesExt;
use signserver::ServerBuilder;
use tracing::info;

/// Pages embarquées : affichage (client.html) et administration (index.html)
#[derive(RustEmbed, Clone)]
#[folder = "webapp"]
struct Webapp;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ========== PHASE 1 : Infrastructure HTTP ==========

    let mut server = ServerBuilder::new_configured().build();
    server.init_logging().await;

    // ========== PHASE 2 : Configuration métier ==========

    info!("🖼️ Initializing image store...");
    let images = server.init_images().await?;

    info!("📺 Initializing fleet controller...");
    server.init_fleet(images).await?;

    // Pages embarquées : l'écran sur /, l'opérateur sur /admin
    server.add_handler("/", display_page).await;
    server.add_handler("/admin", admin_page).await;
    server.add_dir::<Webapp>("/static").await;

    // Route de contrôle de santé
    server
        .add_route("/api", || async {
            serde_json::json!({"message": "SignFleet API running", "version": "0.1.0"})
        })
        .await;

    // Adresses LAN pour la page d'administration
    let port = server.info().http_port;
    server
        .add_route("/server/info", move || async move { server_info(port) })
        .await;

    // ========== PHASE 3 : Démarrage du serveur ==========

    info!("🌐 Starting HTTP server...");
    server.start().await;

    info!("✅ SignFleet is ready!");
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}

/// GET / - interface des écrans
async fn display_page() -> Response {
    embedded_page("client.html")
}

/// GET /admin - interface de l'opérateur
async fn admin_page() -> Response {
    embedded_page("index.html")
}

fn embedded_page(name: &str) -> Response {
    match Webapp::get(name) {
        Some(content) => Html(content.data.into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "page not found").into_response(),
    }
}

/// Adresses IP locales et URLs dérivées, pour affichage à l'opérateur
fn server_info(port: u16) -> serde_json::Value {
    let ips = signutils::list_lan_ips();

    let admin_urls: Vec<String> = ips
        .iter()
        .map(|ip| format!("http://{}:{}/admin", ip, port))
        .collect();
    let display_urls: Vec<String> = ips
        .iter()
        .map(|ip| format!("http://{}:{}/", ip, port))
        .collect();

    serde_json::json!({
        "ips": ips,
        "port": port,
        "admin_urls": admin_urls,
        "display_urls": display_urls,
    })
}
