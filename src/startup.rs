use crate::auth::{GoogleVerifier, SessionSigner};
use crate::configuration::Settings;
use crate::connectors::{LlmClient, LlmConnector};
use crate::db::PoolManager;
use crate::errors::ApiError;
use crate::health::HealthChecker;
use crate::middleware;
use crate::routes;
use crate::services::MessagePipeline;
use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpServer, Resource};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

/// A resource that answers 405 for any method it has no route for.
fn resource(path: &str) -> Resource {
    web::resource(path).default_service(web::to(routes::method_not_allowed))
}

pub async fn run(
    listener: TcpListener,
    pool_manager: Arc<PoolManager>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let verifier = GoogleVerifier::new(&settings.auth)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;

    let llm: Option<Arc<dyn LlmConnector>> = if settings.llm.enabled {
        let client = LlmClient::new(&settings.llm)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        tracing::info!(base_url = %settings.llm.base_url, "LLM service enabled");
        Some(Arc::new(client))
    } else {
        tracing::info!("LLM service disabled, assistant replies are off");
        None
    };

    let request_timeout = Duration::from_secs(settings.request_timeout_secs);
    let signer = web::Data::new(SessionSigner::new(
        &settings.auth.jwt_secret,
        settings.auth.session_ttl_secs,
    ));
    let verifier = web::Data::new(verifier);
    let pipeline = web::Data::new(MessagePipeline::new(pool_manager.clone(), llm.clone()));
    let health_checker = web::Data::new(HealthChecker::new(pool_manager.clone(), llm));
    let settings = web::Data::new(settings);
    let pool_manager = web::Data::from(pool_manager);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::InvalidInput(format!("invalid request body: {}", err)).into()
    });
    let path_config = web::PathConfig::default().error_handler(|err, _req| {
        ApiError::InvalidInput(format!("invalid path parameter: {}", err)).into()
    });
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::InvalidInput(format!("invalid query parameter: {}", err)).into()
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::RequestTimeout::new(request_timeout))
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(json_config.clone())
            .app_data(path_config.clone())
            .app_data(query_config.clone())
            .app_data(pool_manager.clone())
            .app_data(settings.clone())
            .app_data(verifier.clone())
            .app_data(signer.clone())
            .app_data(pipeline.clone())
            .app_data(health_checker.clone())
            .service(resource("/health").route(web::get().to(routes::health_check)))
            .service(
                web::scope("/api")
                    .service(
                        resource("/auth/google").route(web::post().to(routes::auth::google::login)),
                    )
                    .service(
                        resource("/auth/logout")
                            .route(web::post().to(routes::auth::logout::logout)),
                    )
                    .service(
                        resource("/auth/me")
                            .wrap(middleware::authentication::Manager::new())
                            .route(web::get().to(routes::auth::me::item)),
                    )
                    .service(
                        web::scope("/users")
                            .wrap(middleware::authentication::Manager::new())
                            .service(
                                resource("/{uid}/email")
                                    .route(web::get().to(routes::user::get::email)),
                            )
                            .service(
                                resource("/{uid}/workouts")
                                    .route(web::get().to(routes::workout::get::list))
                                    .route(web::post().to(routes::workout::add::item)),
                            )
                            .service(
                                resource("/{uid}/workouts/{wid}")
                                    .route(web::get().to(routes::workout::get::item))
                                    .route(web::put().to(routes::workout::update::item))
                                    .route(web::delete().to(routes::workout::delete::item)),
                            )
                            .service(
                                resource("/{uid}/workouts/{wid}/exercises")
                                    .route(web::get().to(routes::exercise::get::list))
                                    .route(web::post().to(routes::exercise::add::item)),
                            )
                            .service(
                                resource("/{uid}/workouts/{wid}/exercises/{eid}")
                                    .route(web::get().to(routes::exercise::get::item))
                                    .route(web::put().to(routes::exercise::update::item))
                                    .route(web::delete().to(routes::exercise::delete::item)),
                            )
                            .service(
                                resource("/{uid}/conversations")
                                    .route(web::get().to(routes::conversation::get::list))
                                    .route(web::post().to(routes::conversation::add::item)),
                            )
                            .service(
                                resource("/{uid}/conversations/{cid}")
                                    .route(web::get().to(routes::conversation::get::item))
                                    .route(web::put().to(routes::conversation::update::item))
                                    .route(web::delete().to(routes::conversation::delete::item)),
                            )
                            .service(
                                resource("/{uid}/conversations/{cid}/messages")
                                    .route(web::get().to(routes::message::get::list))
                                    .route(web::post().to(routes::message::add::item)),
                            )
                            .service(
                                resource("/{uid}/conversations/{cid}/messages/{mid}")
                                    .route(web::get().to(routes::message::get::item))
                                    .route(web::put().to(routes::message::update::item))
                                    .route(web::delete().to(routes::message::delete::item)),
                            ),
                    ),
            )
            .default_service(web::to(routes::not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
