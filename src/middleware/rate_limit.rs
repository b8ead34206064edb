use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use chrono::{DateTime, Duration, Utc};
use futures_util::future::LocalBoxFuture;
use std::{
    collections::HashMap,
    net::IpAddr,
    rc::Rc,
    sync::{Arc, Mutex},
};

use crate::handlers::shared::ApiResponse;

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: i64,
    pub message: String,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            max_requests,
            window_seconds,
            message: "Rate limit exceeded. Please try again later.".to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[derive(Debug, Clone)]
struct RequestTracker {
    count: u32,
    window_start: DateTime<Utc>,
}

impl RequestTracker {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Utc::now(),
        }
    }

    fn is_expired(&self, window_seconds: i64) -> bool {
        Utc::now() > self.window_start + Duration::seconds(window_seconds)
    }
}

/// Per-IP sliding-window counters behind a mutex; shared across workers.
#[derive(Clone, Default)]
pub struct RateLimitStore {
    trackers: Arc<Mutex<HashMap<IpAddr, RequestTracker>>>,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_and_update(&self, ip: IpAddr, config: &RateLimitConfig) -> bool {
        let mut trackers = self.trackers.lock().unwrap();
        let tracker = trackers.entry(ip).or_insert_with(RequestTracker::new);

        if tracker.is_expired(config.window_seconds) {
            tracker.count = 1;
            tracker.window_start = Utc::now();
            true
        } else if tracker.count >= config.max_requests {
            false
        } else {
            tracker.count += 1;
            true
        }
    }

    pub fn cleanup_expired(&self, window_seconds: i64) {
        let mut trackers = self.trackers.lock().unwrap();
        trackers.retain(|_, tracker| !tracker.is_expired(window_seconds));
    }
}

/// IP-based rate limiting for abuse-prone endpoints.
pub struct RateLimit {
    store: RateLimitStore,
    config: RateLimitConfig,
}

impl RateLimit {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            store: RateLimitStore::new(),
            config,
        }
    }

    /// Stricter limiter for credential guessing on the login endpoint.
    pub fn login() -> Self {
        Self::new(
            RateLimitConfig::new(5, 300)
                .with_message("Too many login attempts. Please try again in 5 minutes."),
        )
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = futures_util::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        futures_util::future::ready(Ok(RateLimitService {
            service: Rc::new(service),
            store: self.store.clone(),
            config: self.config.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    store: RateLimitStore,
    config: RateLimitConfig,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let store = self.store.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let client_ip = req
                .connection_info()
                .peer_addr()
                .and_then(|addr| addr.split(':').next())
                .and_then(|ip| ip.parse::<IpAddr>().ok());

            if let Some(ip) = client_ip {
                if !store.check_and_update(ip, &config) {
                    log::warn!("rate limit exceeded for IP {}", ip);
                    let response =
                        HttpResponse::TooManyRequests().json(ApiResponse::<()>::error(&config.message));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
