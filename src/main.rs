use dotenvy::dotenv;

use video_api::error::ApplicationError;
use video_api::{api, config, database, logger};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = config::load()?;

    let _guard = logger::init(&config)?;

    let repository = database::connect(&config)?;
    let app = api::create_app(repository, config.authenticator());

    api::serve(config.host, api::create_router(app)).await
}
