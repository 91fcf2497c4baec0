/// Access guard middleware
///
/// Looks up the requirement for the request path, validates the bearer
/// access token when one is needed, compares its role claim with the
/// requirement and injects the claims into request extensions for handlers.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;

use super::{AccessPolicy, Requirement};
use crate::auth::{Claims, TokenSigner};
use crate::error::{AppError, AuthError};

pub struct AccessGuard {
    signer: Arc<dyn TokenSigner>,
    policy: Arc<AccessPolicy>,
}

impl AccessGuard {
    pub fn new(signer: Arc<dyn TokenSigner>, policy: AccessPolicy) -> Self {
        Self {
            signer,
            policy: Arc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGuardService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AccessGuardService {
            service: Rc::new(service),
            signer: self.signer.clone(),
            policy: self.policy.clone(),
        }))
    }
}

pub struct AccessGuardService<S> {
    service: Rc<S>,
    signer: Arc<dyn TokenSigner>,
    policy: Arc<AccessPolicy>,
}

impl<S> AccessGuardService<S> {
    fn authorize(&self, req: &ServiceRequest, requirement: Requirement) -> Result<Claims, AuthError> {
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.signer.verify(token)?;
        requirement.check(&claims)?;
        Ok(claims)
    }
}

impl<S, B> Service<ServiceRequest> for AccessGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // match_info holds the decoded path the router matches on; the raw
        // URI path would let `/api/v1/%61dmin` slip past the admin rule.
        let requirement = self.policy.requirement_for(req.match_info().as_str());
        let service = self.service.clone();

        if requirement == Requirement::Public {
            return Box::pin(async move { service.call(req).await });
        }

        match self.authorize(&req, requirement) {
            Ok(claims) => {
                tracing::debug!(
                    username = %claims.username(),
                    role = %claims.role,
                    "Access token accepted"
                );
                req.extensions_mut().insert(claims);
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Request denied by access guard");
                Box::pin(async move { Err(AppError::from(e).into()) })
            }
        }
    }
}
