// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use super::service::UserService;
use crate::error::ApiError;
use crate::iam::AuthRequest;
use crate::posts::handlers::upload_from_field;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub new_password_confirm: Option<String>,
}

#[derive(Debug, MultipartForm)]
pub struct AvatarForm {
    pub avatar: Option<Bytes>,
}

fn require_identity(req: &HttpRequest) -> Result<crate::iam::AuthenticatedUser, ApiError> {
    req.identity()
        .ok_or_else(|| ApiError::Unauthenticated("Authorization token required.".to_string()))
}

pub async fn register(
    body: web::Json<RegisterRequest>,
    service: web::Data<UserService>,
) -> Result<HttpResponse, ApiError> {
    let user = service.register(
        body.name.as_deref(),
        body.email.as_deref(),
        body.password.as_deref(),
        body.password_confirm.as_deref(),
    )?;
    Ok(HttpResponse::Created().json(user))
}

pub async fn login(
    body: web::Json<LoginRequest>,
    service: web::Data<UserService>,
) -> Result<HttpResponse, ApiError> {
    let success = service.login(body.email.as_deref(), body.password.as_deref())?;
    Ok(HttpResponse::Ok().json(success))
}

pub async fn list_authors(service: web::Data<UserService>) -> Result<HttpResponse, ApiError> {
    let authors = service.list_authors()?;
    Ok(HttpResponse::Ok().json(authors))
}

pub async fn get_profile(
    path: web::Path<String>,
    service: web::Data<UserService>,
) -> Result<HttpResponse, ApiError> {
    let user = service.get_profile(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn change_avatar(
    req: HttpRequest,
    MultipartForm(form): MultipartForm<AvatarForm>,
    service: web::Data<UserService>,
) -> Result<HttpResponse, ApiError> {
    let identity = require_identity(&req)?;
    let upload = form.avatar.as_ref().map(upload_from_field);

    let user = service.change_avatar(&identity.id, upload.as_ref())?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn edit_profile(
    req: HttpRequest,
    body: web::Json<EditProfileRequest>,
    service: web::Data<UserService>,
) -> Result<HttpResponse, ApiError> {
    let identity = require_identity(&req)?;

    let user = service.edit_profile(
        &identity.id,
        body.name.as_deref(),
        body.email.as_deref(),
        body.current_password.as_deref(),
        body.new_password.as_deref(),
        body.new_password_confirm.as_deref(),
    )?;
    Ok(HttpResponse::Ok().json(user))
}
