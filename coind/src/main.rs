use clap::Parser;
use tracing::{debug, error};

use coind::{Application, CliArguments, StdResult};

async fn run(params: &CliArguments) -> StdResult<()> {
    let configuration = params.build_configuration()?;

    Application::new(configuration)?.run().await
}

#[tokio::main]
async fn main() -> StdResult<()> {
    let params = CliArguments::parse();

    if let Some(level) = params.get_verbosity_level() {
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    let result = run(&params).await;

    match &result {
        Err(e) => error!("{e:?}"),
        Ok(_) => debug!("soft terminated"),
    };

    result
}
