// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, test, web};
use serde_json::json;
use std::sync::Arc;

use inkpost::assets::AssetStore;
use inkpost::bootstrap::bootstrap_runtime;
use inkpost::config::ValidatedConfig;
use inkpost::iam::JwtService;
use inkpost::posts::PostService;
use inkpost::routes;
use inkpost::runtime_paths::RuntimePaths;
use inkpost::store::{FilePostStore, FileUserStore, PostStore, UserStore};
use inkpost::users::UserService;

pub struct TestHarness {
    _tmp: tempfile::TempDir,
    pub config: ValidatedConfig,
    pub runtime_paths: RuntimePaths,
    pub jwt: JwtService,
    bundle: AppBundle,
}

#[derive(Clone)]
pub struct AppBundle {
    pub config: web::Data<ValidatedConfig>,
    pub jwt: web::Data<JwtService>,
    pub posts: web::Data<PostService>,
    pub users: web::Data<UserService>,
}

impl TestHarness {
    /// Bootstraps a throwaway runtime root exactly the way the server
    /// binary does, then wires the real file stores on top of it.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let bootstrap = bootstrap_runtime(tmp.path()).expect("bootstrap");
        let config = bootstrap.validated_config;
        let runtime_paths = bootstrap.runtime_paths;

        let user_store: Arc<dyn UserStore> = Arc::new(
            FileUserStore::open(runtime_paths.users_file.clone()).expect("user store"),
        );
        let post_store: Arc<dyn PostStore> = Arc::new(
            FilePostStore::open(runtime_paths.posts_file.clone()).expect("post store"),
        );
        let assets = Arc::new(AssetStore::new(
            runtime_paths.uploads_dir.clone(),
            config.upload.allowed_extensions.clone(),
        ));
        let jwt = JwtService::new(&config);

        let posts = web::Data::new(PostService::new(
            post_store,
            user_store.clone(),
            assets.clone(),
            &config,
        ));
        let users = web::Data::new(UserService::new(user_store, assets, jwt.clone(), &config));

        let bundle = AppBundle {
            config: web::Data::new(config.clone()),
            jwt: web::Data::new(jwt.clone()),
            posts,
            users,
        };

        Self {
            _tmp: tmp,
            config,
            runtime_paths,
            jwt,
            bundle,
        }
    }

    pub fn app_bundle(&self) -> AppBundle {
        self.bundle.clone()
    }

    pub fn uploads_dir(&self) -> &std::path::Path {
        &self.runtime_paths.uploads_dir
    }

    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.uploads_dir())
            .expect("read uploads dir")
            .count()
    }
}

pub fn build_test_app(
    bundle: AppBundle,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(bundle.config)
        .app_data(bundle.jwt)
        .app_data(bundle.posts)
        .app_data(bundle.users)
        .configure(routes::configure)
}

pub const MULTIPART_BOUNDARY: &str = "inkpost-test-boundary";

/// Hand-rolled multipart/form-data payload: text fields followed by file
/// parts, closed with the final boundary.
pub fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> (String, Vec<u8>) {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    let content_type = format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY);
    (content_type, body)
}

pub fn bearer(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub fn register_request(name: &str, email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/users/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": password,
            "password_confirm": password,
        }))
}

pub fn login_request(email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "email": email, "password": password }))
}

pub fn create_post_request(
    token: &str,
    title: &str,
    category: &str,
    desc: &str,
    file_name: &str,
    bytes: &[u8],
) -> test::TestRequest {
    let (content_type, body) = multipart_body(
        &[("title", title), ("category", category), ("desc", desc)],
        &[("thumbnail", file_name, bytes)],
    );
    bearer(
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body),
        token,
    )
}

pub fn edit_post_request(
    token: &str,
    post_id: &str,
    title: &str,
    category: &str,
    desc: &str,
    file: Option<(&str, &[u8])>,
) -> test::TestRequest {
    let files: Vec<(&str, &str, &[u8])> = match file {
        Some((file_name, bytes)) => vec![("thumbnail", file_name, bytes)],
        None => Vec::new(),
    };
    let (content_type, body) = multipart_body(
        &[("title", title), ("category", category), ("desc", desc)],
        &files,
    );
    bearer(
        test::TestRequest::patch()
            .uri(&format!("/api/posts/{}", post_id))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body),
        token,
    )
}

pub fn change_avatar_request(token: &str, file_name: &str, bytes: &[u8]) -> test::TestRequest {
    let (content_type, body) = multipart_body(&[], &[("avatar", file_name, bytes)]);
    bearer(
        test::TestRequest::post()
            .uri("/api/users/change-av")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body),
        token,
    )
}
