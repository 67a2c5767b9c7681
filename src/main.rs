use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use oripa_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建JWT服务
    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expires_in);

    // 创建服务
    let offering_service = OfferingService::new(pool.clone());
    let pool_service = PoolService::new(pool.clone());
    let draw_service = DrawService::new(pool.clone(), config.draw.disposition_deadline_days);
    let disposition_service = DispositionService::new(pool.clone());
    let player_service = PlayerService::new(pool.clone());

    // 启动后台到期扫描任务
    tasks::spawn_all(
        disposition_service.clone(),
        config.draw.sweep_interval_secs,
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(offering_service.clone()))
            .app_data(web::Data::new(pool_service.clone()))
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(web::Data::new(disposition_service.clone()))
            .app_data(web::Data::new(player_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    // 先注册具体的抽选路由, 再注册 /offerings 浏览 scope
                    .configure(handlers::draw_config)
                    .configure(handlers::offering_config)
                    .configure(handlers::disposition_config)
                    .configure(handlers::player_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
