// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::iam::RequireAuth;
use crate::posts::handlers as post_handlers;
use crate::users::handlers as user_handlers;

/// Headroom above the 2 MB thumbnail policy so an oversized upload
/// reaches the asset store and fails with the proper error body instead
/// of a generic multipart rejection.
pub const MULTIPART_MEMORY_LIMIT: usize = 8 * 1024 * 1024;

/// Route table. Literal paths register before `{id}` captures; mutating
/// routes sit behind the auth gate.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(MultipartFormConfig::default().memory_limit(MULTIPART_MEMORY_LIMIT))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/posts")
                        .route(
                            "",
                            web::post().to(post_handlers::create_post).wrap(RequireAuth),
                        )
                        .route("", web::get().to(post_handlers::list_posts))
                        .route(
                            "/categories/{category}",
                            web::get().to(post_handlers::list_category_posts),
                        )
                        .route("/users/{id}", web::get().to(post_handlers::list_user_posts))
                        .route("/{id}", web::get().to(post_handlers::get_post))
                        .route(
                            "/{id}",
                            web::patch().to(post_handlers::edit_post).wrap(RequireAuth),
                        )
                        .route(
                            "/{id}",
                            web::delete()
                                .to(post_handlers::delete_post)
                                .wrap(RequireAuth),
                        ),
                )
                .service(
                    web::scope("/users")
                        .route("/register", web::post().to(user_handlers::register))
                        .route("/login", web::post().to(user_handlers::login))
                        .route(
                            "/change-av",
                            web::post()
                                .to(user_handlers::change_avatar)
                                .wrap(RequireAuth),
                        )
                        .route(
                            "/edit-user",
                            web::patch()
                                .to(user_handlers::edit_profile)
                                .wrap(RequireAuth),
                        )
                        .route("", web::get().to(user_handlers::list_authors))
                        .route("/{id}", web::get().to(user_handlers::get_profile)),
                ),
        );
}
