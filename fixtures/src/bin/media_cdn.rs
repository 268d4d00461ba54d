use clap::Parser;
use fixtures::{
    cdn::{self, CdnConfig, CdnState},
    require_env_var, run_server, FixtureArgs,
};

/// Media CDN fixture server
#[derive(Parser, Debug)]
#[clap(name = "media-cdn-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,

    /// Base URL returned for stored files
    #[arg(long, default_value = "http://localhost:4000/media")]
    url_endpoint: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let config = CdnConfig {
        public_key: require_env_var("MEDIA_PUBLIC_KEY", "public_dev_key", args.common.force)?,
        private_key: require_env_var("MEDIA_PRIVATE_KEY", "private_dev_key", args.common.force)?,
        url_endpoint: args.url_endpoint,
    };

    let app = cdn::router(CdnState::new(config));

    run_server(args.common, app).await
}
