use std::sync::Arc;

use anyhow::Context;
use phone_sso::config::AppConfig;
use phone_sso::db::Database;
use phone_sso::gateway::{self, state::AppState};
use phone_sso::storage::{ContentStore, CredentialStore, MemoryStore, PgStore, TenantRegistry};
use phone_sso::user_auth::AuthService;

// ============================================================
// ARGS
// ============================================================

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn use_memory_store() -> bool {
    std::env::args().any(|a| a == "--memory")
}

// ============================================================
// STORES
// ============================================================

struct Stores {
    credentials: Arc<dyn CredentialStore>,
    tenants: Arc<dyn TenantRegistry>,
    content: Arc<dyn ContentStore>,
    db: Option<Arc<Database>>,
}

async fn open_postgres(url: &str) -> anyhow::Result<Stores> {
    let db = Database::connect(url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!("PostgreSQL connected, migrations applied");

    let db = Arc::new(db);
    let store = Arc::new(PgStore::new(db.clone()));
    Ok(Stores {
        credentials: store.clone(),
        tenants: store.clone(),
        content: store,
        db: Some(db),
    })
}

/// In-process store with the development app and a small demo catalog
fn open_memory() -> Stores {
    let store = MemoryStore::new().with_app(1, "dev-secret-change-me");
    store.add_author(
        1,
        "Fyodor Dostoevsky",
        "Russian novelist, author of \"Crime and Punishment\"",
        "/img/authors/dostoevsky.png",
        Some(101),
    );
    store.add_author(
        2,
        "Leo Tolstoy",
        "Russian novelist, author of \"War and Peace\"",
        "/img/authors/tolstoy.png",
        None,
    );
    store.add_article(1, "On Reading Slowly", "/img/articles/1.png", "Why long novels reward patience");
    store.add_poet(1, "Alexander Pushkin", "/img/poets/pushkin.png");
    store.add_quiz(
        1,
        "Who wrote \"Crime and Punishment\"?",
        &[(1, "Dostoevsky", true), (2, "Tolstoy", false), (3, "Chekhov", false)],
    );
    store.add_clip(
        101,
        "/img/clips/101.png",
        1,
        &[
            "A former student lives in a cramped room in St. Petersburg.",
            "He plans a crime and tells himself it is justified.",
        ],
    );

    let store = Arc::new(store);
    Stores {
        credentials: store.clone(),
        tenants: store.clone(),
        content: store,
        db: None,
    }
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = phone_sso::logging::init_logging(&app_config);

    tracing::info!("Starting phone_sso in {} mode", env);

    let stores = match (&app_config.postgres_url, use_memory_store()) {
        (Some(url), false) => open_postgres(url).await?,
        (None, false) => {
            tracing::warn!("No postgres_url configured, using in-process store");
            open_memory()
        }
        (_, true) => {
            tracing::warn!("--memory: using in-process store, data is lost on exit");
            open_memory()
        }
    };

    let auth = Arc::new(AuthService::new(
        &app_config.auth,
        stores.credentials,
        stores.tenants,
    )?);
    let state = Arc::new(AppState::new(
        auth,
        stores.content,
        stores.db,
        app_config.auth.op_timeout(),
    ));

    gateway::run_server(&app_config.gateway, state).await
}
