use std::sync::Arc;

use actix_web::{
    delete,
    error::InternalError,
    get,
    http::header,
    post, put,
    web::{self, Data},
    HttpRequest, HttpResponse,
};
use database::{
    consts::consts::PersonId, database::request_manager::RequestManager, model::person::Person,
};

use crate::{
    config::ConfigProvider,
    error::PeopleError,
    notifier::Notifier,
    service::{PeopleService, WritePolicy},
    validation::ValidationErrors,
};

/// Shared by every worker, each request builds its own service from it
pub struct AppState {
    pub request_manager: RequestManager,
    pub notifier: Arc<Notifier>,
    pub config: Arc<dyn ConfigProvider>,
    pub policy: WritePolicy,
}

impl AppState {
    pub fn service(&self) -> PeopleService<RequestManager> {
        PeopleService::new(
            self.request_manager.clone(),
            self.notifier.clone(),
            self.config.clone(),
            self.policy,
        )
    }
}

#[get("/api/people")]
async fn list_people(state: Data<AppState>) -> Result<HttpResponse, PeopleError> {
    let service = state.service();

    let people = web::block(move || service.list()).await??;

    Ok(HttpResponse::Ok().json(people))
}

#[get("/api/people/{id}", name = "get_person")]
async fn get_person(
    state: Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, PeopleError> {
    let service = state.service();
    let id = PersonId(id.into_inner());

    let person = web::block(move || service.get(id)).await??;

    Ok(HttpResponse::Ok().json(person))
}

#[post("/api/people")]
async fn create_person(
    req: HttpRequest,
    state: Data<AppState>,
    person: web::Json<Person>,
) -> actix_web::Result<HttpResponse> {
    let service = state.service();
    let person = person.into_inner();

    let created = web::block(move || service.create(person))
        .await
        .map_err(PeopleError::from)??;

    let location = req.url_for("get_person", [created.id.to_string()])?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location.as_str()))
        .json(created))
}

#[put("/api/people/{id}")]
async fn update_person(
    state: Data<AppState>,
    id: web::Path<i32>,
    person: web::Json<Person>,
) -> Result<HttpResponse, PeopleError> {
    let service = state.service();
    let id = PersonId(id.into_inner());
    let person = person.into_inner();

    web::block(move || service.update(id, person)).await??;

    Ok(HttpResponse::NoContent().finish())
}

#[delete("/api/people/{id}")]
async fn delete_person(
    state: Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, PeopleError> {
    let service = state.service();
    let id = PersonId(id.into_inner());

    let removed = web::block(move || service.delete(id)).await??;

    Ok(HttpResponse::Ok().json(removed))
}

/// Body binding failures (bad JSON, missing or mistyped fields) answer 400 with the same model
/// state shape as validation failures
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let mut errors = ValidationErrors::new();
        errors
            .model_state
            .insert("person".to_string(), vec![err.to_string()]);

        let response = HttpResponse::BadRequest().json(&errors);

        InternalError::from_response(err, response).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(list_people)
        .service(get_person)
        .service(create_person)
        .service(update_person)
        .service(delete_person);
}

#[cfg(test)]
mod tests {
    use actix_web::{
        body::to_bytes,
        http::StatusCode,
        test::{self, TestRequest},
        App,
    };
    use database::database::{database::Database, options::DatabaseOptions};
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        config::{InMemoryConfigProvider, MESSAGE_QUEUE_SETTING},
        test_utils::{RecordingTransport, TransportBehaviour},
    };

    fn test_state(message_queue: bool, behaviour: TransportBehaviour) -> AppState {
        let request_manager = Database::new(DatabaseOptions::new_test())
            .unwrap()
            .run()
            .unwrap();

        AppState {
            request_manager,
            notifier: Arc::new(Notifier::new(Arc::new(RecordingTransport::new(behaviour)))),
            config: Arc::new(
                InMemoryConfigProvider::new().with(MESSAGE_QUEUE_SETTING, message_queue),
            ),
            policy: WritePolicy::default(),
        }
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(App::new().app_data(Data::new($state)).configure(configure)).await
        };
    }

    fn post_person(body: Value) -> TestRequest {
        TestRequest::post().uri("/api/people").set_json(body)
    }

    #[actix_web::test]
    async fn create_then_get_returns_the_same_record() {
        let app = test_app!(test_state(false, TransportBehaviour::Accept));

        let response = test::call_service(
            &app,
            post_person(json!({ "FirstName": "A", "LastName": "B" })).to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.ends_with("/api/people/1"));

        let created: Person = test::read_body_json(response).await;
        assert_eq!(created, Person::new("A", "B").with_id(PersonId(1)));

        let fetched: Person = test::call_and_read_body_json(
            &app,
            TestRequest::get().uri("/api/people/1").to_request(),
        )
        .await;
        assert_eq!(fetched, created);
    }

    #[actix_web::test]
    async fn list_returns_every_record() {
        let app = test_app!(test_state(false, TransportBehaviour::Accept));

        for name in ["A", "C"] {
            test::call_service(&app, post_person(json!({ "FirstName": name, "LastName": "B" })).to_request())
                .await;
        }

        let people: Vec<Person> =
            test::call_and_read_body_json(&app, TestRequest::get().uri("/api/people").to_request())
                .await;

        assert_eq!(people.len(), 2);
    }

    #[actix_web::test]
    async fn missing_records_are_not_found_everywhere() {
        let app = test_app!(test_state(false, TransportBehaviour::Accept));

        let requests = [
            TestRequest::get().uri("/api/people/7").to_request(),
            TestRequest::put()
                .uri("/api/people/7")
                .set_json(json!({ "Id": 7, "FirstName": "A", "LastName": "B" }))
                .to_request(),
            TestRequest::delete().uri("/api/people/7").to_request(),
        ];

        for request in requests {
            let response = test::call_service(&app, request).await;

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert!(to_bytes(response.into_body()).await.unwrap().is_empty());
        }
    }

    #[actix_web::test]
    async fn missing_required_field_is_a_bad_request() {
        let app = test_app!(test_state(false, TransportBehaviour::Accept));

        let response = test::call_service(&app, post_person(json!({ "FirstName": "A" })).to_request()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["Message"], "The request is invalid.");
        assert!(body["ModelState"]["person"][0]
            .as_str()
            .unwrap()
            .contains("LastName"));
    }

    #[actix_web::test]
    async fn blank_name_is_a_bad_request() {
        let app = test_app!(test_state(false, TransportBehaviour::Accept));

        let response = test::call_service(
            &app,
            post_person(json!({ "FirstName": " ", "LastName": "B" })).to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert!(body["ModelState"]["person.FirstName"].is_array());
    }

    #[actix_web::test]
    async fn update_replaces_and_answers_no_content() {
        let app = test_app!(test_state(false, TransportBehaviour::Accept));
        test::call_service(&app, post_person(json!({ "FirstName": "A", "LastName": "B" })).to_request())
            .await;

        let response = test::call_service(
            &app,
            TestRequest::put()
                .uri("/api/people/1")
                .set_json(json!({ "Id": 1, "FirstName": "C", "LastName": "D", "Address": "Here" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(to_bytes(response.into_body()).await.unwrap().is_empty());

        let fetched: Person = test::call_and_read_body_json(
            &app,
            TestRequest::get().uri("/api/people/1").to_request(),
        )
        .await;
        assert_eq!(fetched, Person::new("C", "D").with_id(PersonId(1)).with_address("Here"));
    }

    #[actix_web::test]
    async fn update_with_mismatched_id_is_a_bad_request() {
        let app = test_app!(test_state(false, TransportBehaviour::Accept));
        test::call_service(&app, post_person(json!({ "FirstName": "A", "LastName": "B" })).to_request())
            .await;

        let response = test::call_service(
            &app,
            TestRequest::put()
                .uri("/api/people/1")
                .set_json(json!({ "Id": 2, "FirstName": "C", "LastName": "D" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn delete_returns_the_removed_record_once() {
        let app = test_app!(test_state(false, TransportBehaviour::Accept));
        test::call_service(&app, post_person(json!({ "FirstName": "A", "LastName": "B" })).to_request())
            .await;

        let removed: Person = test::call_and_read_body_json(
            &app,
            TestRequest::delete().uri("/api/people/1").to_request(),
        )
        .await;
        assert_eq!(removed, Person::new("A", "B").with_id(PersonId(1)));

        let response =
            test::call_service(&app, TestRequest::delete().uri("/api/people/1").to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn failing_queue_fails_the_create_before_persisting() {
        let app = test_app!(test_state(true, TransportBehaviour::FailSend));

        let response = test::call_service(
            &app,
            post_person(json!({ "FirstName": "A", "LastName": "B" })).to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["Message"], "An error has occurred.");

        let people: Vec<Person> =
            test::call_and_read_body_json(&app, TestRequest::get().uri("/api/people").to_request())
                .await;
        assert!(people.is_empty());
    }
}
