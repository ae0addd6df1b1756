//! Session helpers keeping HTTP handlers free of framework-specific logic.
//!
//! Wraps the actix session so handlers deal in domain terms: persisting a
//! user id, requiring one, and flashing notifications across the activation
//! redirect.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::domain::user::UserId;
use crate::domain::{Error, Notification};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const NOTIFICATIONS_KEY: &str = "notifications";

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Current user id, if one is logged in.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match raw {
            Some(raw) => match raw.parse::<Uuid>() {
                Ok(id) => Ok(Some(UserId::from_uuid(id))),
                Err(error) => {
                    tracing::warn!(%error, "invalid user id in session cookie");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or fail with `401 unauthenticated`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?.ok_or_else(|| {
            Error::unauthorized("unauthenticated", "no user id in session")
        })
    }

    /// Drop everything stored in the session.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Queue a notification for the next response that collects them.
    pub fn flash(&self, notification: Notification) -> Result<(), Error> {
        let mut pending = self.peek_notifications()?;
        pending.push(notification);
        self.0
            .insert(NOTIFICATIONS_KEY, pending)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Remove and return the queued notifications.
    pub fn take_notifications(&self) -> Result<Vec<Notification>, Error> {
        let pending = self.peek_notifications()?;
        self.0.remove(NOTIFICATIONS_KEY);
        Ok(pending)
    }

    fn peek_notifications(&self) -> Result<Vec<Notification>, Error> {
        Ok(self
            .0
            .get::<Vec<Notification>>(NOTIFICATIONS_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?
            .unwrap_or_default())
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    //! Session identity and flash notification round-trips.
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use super::*;
    use crate::inbound::http::test_utils::test_session_middleware;

    fn session_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().wrap(test_session_middleware())
    }

    #[actix_web::test]
    async fn round_trips_the_user_id() {
        let app = test::init_service(
            session_app()
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let id = UserId::from_uuid(
                            "3fa85f64-5717-4562-b3fc-2c963f66afa6"
                                .parse()
                                .expect("fixture uuid"),
                        );
                        session.persist_user(&id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let id = session.require_user_id()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorised() {
        let app = test::init_service(session_app().route(
            "/require",
            web::get().to(|session: SessionContext| async move {
                let _ = session.require_user_id()?;
                Ok::<_, Error>(HttpResponse::Ok())
            }),
        ))
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn flashed_notifications_are_taken_once() {
        let app = test::init_service(
            session_app()
                .route(
                    "/flash",
                    web::get().to(|session: SessionContext| async move {
                        session.flash(Notification::success("Account activated."))?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/collect",
                    web::get().to(|session: SessionContext| async move {
                        let notifications = session.take_notifications()?;
                        Ok::<_, Error>(HttpResponse::Ok().json(notifications))
                    }),
                ),
        )
        .await;

        let flash_res =
            test::call_service(&app, test::TestRequest::get().uri("/flash").to_request()).await;
        let cookie = flash_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let collect_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/collect")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let cookie = collect_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|c| c.into_owned());
        let body: Vec<Notification> = test::read_body_json(collect_res).await;
        assert_eq!(body, vec![Notification::success("Account activated.")]);

        let mut second = test::TestRequest::get().uri("/collect");
        if let Some(cookie) = cookie {
            second = second.cookie(cookie);
        }
        let second_res = test::call_service(&app, second.to_request()).await;
        let body: Vec<Notification> = test::read_body_json(second_res).await;
        assert!(body.is_empty(), "notifications must flash exactly once");
    }
}
