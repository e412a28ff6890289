use anyhow::{anyhow, Result};
use character_node::{
    api::{create_router, AppState},
    config::NodeConfig,
    ownership::EthereumOwnershipOracle,
    policy::UpdateVerifier,
    storage::{CharacterStore, FileCharacterStore},
    CharacterService,
};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Character node arguments
#[derive(Parser)]
#[clap(name = "character-node")]
#[clap(about = "Yamete Kudasai character metadata node with owner-signed profile updates")]
struct Args {
    /// Path to node configuration file
    #[clap(long, default_value = "config/node.yaml")]
    config: PathBuf,

    /// API port to listen on
    #[clap(long)]
    port: Option<u16>,

    /// Ethereum JSON-RPC endpoint
    #[clap(long)]
    rpc_url: Option<String>,

    /// Deployed token contract address
    #[clap(long)]
    contract: Option<String>,

    /// Character database file
    #[clap(long)]
    database: Option<String>,
}

impl Args {
    fn apply(self, mut config: NodeConfig) -> NodeConfig {
        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(rpc_url) = self.rpc_url {
            config.oracle.rpc_url = rpc_url;
        }
        if let Some(contract) = self.contract {
            config.oracle.contract_address = Some(contract);
        }
        if let Some(database) = self.database {
            config.storage.database_file = database;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Config path: {:?}", args.config);

    let config = if args.config.exists() {
        NodeConfig::from_file(&args.config)?
    } else {
        info!("Config file not found, using defaults");
        NodeConfig::default()
    };
    let config = args.apply(config);
    config.validate()?;

    let contract = config
        .oracle
        .contract_address
        .as_deref()
        .ok_or_else(|| anyhow!("oracle.contract_address (or --contract) is required"))?;
    let oracle = Arc::new(EthereumOwnershipOracle::new(&config.oracle.rpc_url, contract)?);
    info!(
        "Ownership oracle: {} @ {}",
        contract, config.oracle.rpc_url
    );

    let store: Arc<dyn CharacterStore> =
        Arc::new(FileCharacterStore::new(&config.storage.database_file));
    let characters = store.load_all().await?;
    info!(
        "Loaded {} characters from {}",
        characters.len(),
        config.storage.database_file
    );

    let service = CharacterService::new(store.clone(), oracle, config.oracle.timeout());
    let verifier = UpdateVerifier::new(store, service.sync().clone())
        .with_claims(&config.auth.audience, &config.auth.action);
    let service = service.with_verifier(verifier);

    let app = create_router(AppState::new(Arc::new(service)));

    let addr = config.listen_addr();
    info!("Starting API server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
