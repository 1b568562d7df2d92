use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use parkslot_api::middleware::auth::hash_password;
use parkslot_core::admin::seed_admin;
use parkslot_db::{create_pool, schema::initialize_database, PgStore};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load environment variables
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;

    info!("Connecting to database...");
    let db_pool = create_pool(&database_url).await?;

    info!("Initializing database schema...");
    initialize_database(&db_pool).await?;
    info!("Database schema initialized successfully.");

    // Seed the first admin account when credentials are provided
    let (Ok(email), Ok(password)) = (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
    else {
        warn!("ADMIN_EMAIL or ADMIN_PASSWORD not set, skipping admin seed");
        return Ok(());
    };
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());

    let store = PgStore::new(db_pool);
    let password_hash = hash_password(&password)?;
    let (admin, created) = seed_admin(&store, &name, &email, &password_hash).await?;
    if created {
        info!(user_id = %admin.id, "Admin account created");
    } else {
        info!(user_id = %admin.id, "Admin account already present");
    }

    Ok(())
}
