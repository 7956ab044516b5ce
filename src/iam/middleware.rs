// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, HttpRequest, ResponseError};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc; // services are per-thread

use super::jwt::JwtService;
use crate::error::ApiError;

/// Identity decoded from a verified bearer token and attached to the
/// request for the lifetime of the handler call.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub name: String,
}

/// Trait to add authentication accessors to HttpRequest
pub trait AuthRequest {
    fn identity(&self) -> Option<AuthenticatedUser>;
    fn is_authenticated(&self) -> bool;
}

impl AuthRequest for HttpRequest {
    fn identity(&self) -> Option<AuthenticatedUser> {
        self.extensions().get::<AuthenticatedUser>().cloned()
    }

    fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }
}

/// Gate in front of every mutating route: extracts the `Bearer` token,
/// verifies it, and either attaches the identity or rejects with 401
/// before the inner service runs. Missing, malformed, forged and expired
/// credentials are deliberately indistinguishable to the caller.
pub struct RequireAuth;

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(jwt_service) = req.app_data::<Data<JwtService>>().cloned() else {
                log::error!("JwtService missing from app data; auth gate cannot verify tokens");
                return Ok(reject(
                    req,
                    ApiError::Internal("auth gate missing JWT service".to_string()),
                ));
            };

            let Some(token) = bearer_token(&req) else {
                return Ok(reject(
                    req,
                    ApiError::Unauthenticated("Authorization token required.".to_string()),
                ));
            };

            match jwt_service.verify_token(&token) {
                Ok(claims) => {
                    req.extensions_mut().insert(AuthenticatedUser {
                        id: claims.sub,
                        name: claims.name,
                    });
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    log::warn!("rejected bearer token: {}", err);
                    Ok(reject(
                        req,
                        ApiError::Unauthenticated("Invalid or expired token.".to_string()),
                    ))
                }
            }
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;
    let token = header_value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn reject<B>(req: ServiceRequest, err: ApiError) -> ServiceResponse<EitherBody<B>> {
    let (req, _payload) = req.into_parts();
    let response = err.error_response().map_into_right_body();
    ServiceResponse::new(req, response)
}
