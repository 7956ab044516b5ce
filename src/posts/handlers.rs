// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes;
use actix_multipart::form::text::Text;
use actix_web::{HttpRequest, HttpResponse, web};

use super::service::PostService;
use crate::assets::UploadedFile;
use crate::error::ApiError;
use crate::iam::AuthRequest;

/// Multipart body shared by create and edit. Everything is optional at
/// the decode layer; the service decides what is actually required.
#[derive(Debug, MultipartForm)]
pub struct PostForm {
    pub title: Option<Text<String>>,
    pub category: Option<Text<String>>,
    pub desc: Option<Text<String>>,
    pub thumbnail: Option<Bytes>,
}

pub(crate) fn upload_from_field(field: &Bytes) -> UploadedFile {
    let original_name = field
        .file_name
        .clone()
        .unwrap_or_else(|| "upload".to_string());
    UploadedFile::new(original_name, field.data.to_vec())
}

fn require_identity(req: &HttpRequest) -> Result<crate::iam::AuthenticatedUser, ApiError> {
    req.identity()
        .ok_or_else(|| ApiError::Unauthenticated("Authorization token required.".to_string()))
}

pub async fn create_post(
    req: HttpRequest,
    MultipartForm(form): MultipartForm<PostForm>,
    service: web::Data<PostService>,
) -> Result<HttpResponse, ApiError> {
    let identity = require_identity(&req)?;
    let thumbnail = form.thumbnail.as_ref().map(upload_from_field);

    let post = service.create(
        form.title.as_deref().map(String::as_str),
        form.category.as_deref().map(String::as_str),
        form.desc.as_deref().map(String::as_str),
        thumbnail.as_ref(),
        &identity.id,
    )?;

    Ok(HttpResponse::Created().json(post))
}

pub async fn list_posts(service: web::Data<PostService>) -> Result<HttpResponse, ApiError> {
    let posts = service.list()?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_post(
    path: web::Path<String>,
    service: web::Data<PostService>,
) -> Result<HttpResponse, ApiError> {
    let post = service.get(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn list_category_posts(
    path: web::Path<String>,
    service: web::Data<PostService>,
) -> Result<HttpResponse, ApiError> {
    let posts = service.list_by_category(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn list_user_posts(
    path: web::Path<String>,
    service: web::Data<PostService>,
) -> Result<HttpResponse, ApiError> {
    let posts = service.list_by_creator(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn edit_post(
    req: HttpRequest,
    path: web::Path<String>,
    MultipartForm(form): MultipartForm<PostForm>,
    service: web::Data<PostService>,
) -> Result<HttpResponse, ApiError> {
    let identity = require_identity(&req)?;
    let thumbnail = form.thumbnail.as_ref().map(upload_from_field);

    let post = service.edit(
        &path.into_inner(),
        &identity.id,
        form.title.as_deref().map(String::as_str),
        form.category.as_deref().map(String::as_str),
        form.desc.as_deref().map(String::as_str),
        thumbnail.as_ref(),
    )?;

    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    req: HttpRequest,
    path: web::Path<String>,
    service: web::Data<PostService>,
) -> Result<HttpResponse, ApiError> {
    let identity = require_identity(&req)?;
    let id = path.into_inner();

    service.delete(&id, &identity.id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Post {} deleted.", id),
    })))
}
