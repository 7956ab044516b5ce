// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{App, HttpServer, middleware::Logger, web};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use inkpost::assets::AssetStore;
use inkpost::bootstrap::{BootstrapResult, bootstrap_runtime};
use inkpost::iam::JwtService;
use inkpost::posts::PostService;
use inkpost::routes;
use inkpost::store::{FilePostStore, FileUserStore, PostStore, UserStore};
use inkpost::users::UserService;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let bootstrap = match bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    match actix_web::rt::System::new().block_on(run_server(bootstrap)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

struct ParsedArgs {
    runtime_root: PathBuf,
}

fn parse_args() -> Result<ParsedArgs, String> {
    let mut runtime_root = PathBuf::from(".");
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-C" => {
                let value = args
                    .next()
                    .ok_or_else(|| "-C requires a directory".to_string())?;
                runtime_root = PathBuf::from(value);
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(ParsedArgs { runtime_root })
}

async fn run_server(bootstrap: BootstrapResult) -> std::io::Result<()> {
    let BootstrapResult {
        validated_config: config,
        runtime_paths,
        ..
    } = bootstrap;

    let user_store: Arc<dyn UserStore> = Arc::new(
        FileUserStore::open(runtime_paths.users_file.clone())
            .map_err(|e| std::io::Error::other(e.to_string()))?,
    );
    let post_store: Arc<dyn PostStore> = Arc::new(
        FilePostStore::open(runtime_paths.posts_file.clone())
            .map_err(|e| std::io::Error::other(e.to_string()))?,
    );
    let assets = Arc::new(AssetStore::new(
        runtime_paths.uploads_dir.clone(),
        config.upload.allowed_extensions.clone(),
    ));
    let jwt = JwtService::new(&config);

    let post_service = web::Data::new(PostService::new(
        post_store,
        user_store.clone(),
        assets.clone(),
        &config,
    ));
    let user_service = web::Data::new(UserService::new(
        user_store,
        assets,
        jwt.clone(),
        &config,
    ));
    let jwt_data = web::Data::new(jwt);
    let config_data = web::Data::new(config.clone());

    let host = config.server.host.clone();
    let port = config.server.port;
    let workers = config.server.workers;

    info!("Starting Inkpost on {}:{}", host, port);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(config_data.clone())
            .app_data(jwt_data.clone())
            .app_data(post_service.clone())
            .app_data(user_service.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?;

    if let Some(workers) = workers {
        server = server.workers(workers);
    }

    server.run().await
}
