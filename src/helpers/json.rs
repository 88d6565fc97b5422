use crate::errors::ApiError;
use actix_web::HttpResponse;
use serde::Serialize;

/// Response bodies are the bare entity, or a bare array for listings.
pub(crate) struct JsonResponse<T> {
    item: Option<T>,
    list: Option<Vec<T>>,
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    pub(crate) fn build() -> Self {
        Self {
            item: None,
            list: None,
        }
    }

    pub(crate) fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub(crate) fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    fn respond(self, mut builder: actix_web::HttpResponseBuilder) -> HttpResponse {
        match (self.item, self.list) {
            (Some(item), _) => builder.json(item),
            (None, Some(list)) => builder.json(list),
            (None, None) => builder.json(serde_json::json!({})),
        }
    }

    pub(crate) fn ok(self) -> HttpResponse {
        self.respond(HttpResponse::Ok())
    }

    pub(crate) fn created(self) -> HttpResponse {
        self.respond(HttpResponse::Created())
    }

    /// 200 with `{"deleted_id": id}` merged into the deleted entity when one is set.
    pub(crate) fn deleted(self, id: i64) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse::Ok().json(deleted_body(self.item, id)?))
    }
}

fn deleted_body<T: Serialize>(item: Option<T>, id: i64) -> Result<serde_json::Value, ApiError> {
    let mut body = match item {
        Some(item) => serde_json::to_value(item)
            .map_err(|err| ApiError::Internal(format!("serialize deleted entity: {err}")))?,
        None => serde_json::json!({}),
    };

    match body.as_object_mut() {
        Some(object) => {
            object.insert("deleted_id".to_string(), id.into());
            Ok(body)
        }
        None => Ok(serde_json::json!({ "deleted_id": id, "item": body })),
    }
}
