mod error;
mod job_schedulers;
mod reminder;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::start_send_reminders_job;
use std::net::TcpListener;
use taskflow_infra::TaskflowContext;
use tracing_actix_web::TracingLogger;

pub use reminder::{ReminderRuns, SendTaskRemindersUseCase};

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    reminder::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    runs: ReminderRuns,
}

impl Application {
    pub async fn new(context: TaskflowContext) -> Result<Self, std::io::Error> {
        let runs = ReminderRuns::new();
        let (server, port) = Application::configure_server(context.clone(), runs.clone()).await?;
        Application::start_job_schedulers(context, runs.clone());

        Ok(Self { server, port, runs })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: TaskflowContext, runs: ReminderRuns) {
        start_send_reminders_job(context, runs);
    }

    async fn configure_server(
        context: TaskflowContext,
        runs: ReminderRuns,
    ) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();
            let runs = runs.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .app_data(web::Data::new(runs))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Runs the server until it is stopped, then waits for ongoing reminder
    /// runs to store their timestamps
    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;
        self.runs.shutdown().await;
        res
    }
}
