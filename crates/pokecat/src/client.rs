use crate::prelude::*;
use async_trait::async_trait;
use pokecat_core::pokemon::{
    CategoryMembership, EntityDetail, EntityRef, ListPage, Pokemon, PokemonListResponse,
    TypeListResponse, TypeResponse,
};
use pokecat_core::CatalogError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

pub const POKEAPI_BASE: &str = "https://pokeapi.co/api/v2";

/// Read-only access to the catalog backend.
///
/// The shell talks to PokéAPI through [`PokeApiClient`]; tests substitute
/// in-memory sources.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// `GET /pokemon?offset={offset}&limit={limit}`
    async fn list_page(&self, offset: usize, limit: usize) -> Result<ListPage, CatalogError>;

    /// `GET /pokemon/{idOrName}`
    async fn entity(&self, entity: &EntityRef) -> Result<EntityDetail, CatalogError>;

    /// `GET /type`
    async fn category_names(&self) -> Result<Vec<String>, CatalogError>;

    /// `GET /type/{name}`
    async fn category(&self, name: &str) -> Result<CategoryMembership, CatalogError>;
}

#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("pokecat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}{path}` and decode the JSON body.
    ///
    /// 404 maps to `NotFound`, any other non-2xx status to `NetworkFailure`.
    /// Bodies of failed responses are never parsed.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = format!("{}{path}", self.base_url);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::network(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::not_found(
                path.trim_start_matches('/').split('?').next().unwrap_or(path),
            ));
        }

        if !status.is_success() {
            return Err(CatalogError::network(&url, format!("HTTP {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::decode(&url, e))
    }
}

#[async_trait]
impl DataSource for PokeApiClient {
    async fn list_page(&self, offset: usize, limit: usize) -> Result<ListPage, CatalogError> {
        let response: PokemonListResponse = self
            .get_json(&format!("/pokemon?offset={offset}&limit={limit}"))
            .await?;
        Ok(ListPage::from(response))
    }

    async fn entity(&self, entity: &EntityRef) -> Result<EntityDetail, CatalogError> {
        let segment = urlencoding::encode(&entity.path_segment()).into_owned();
        let pokemon: Pokemon = self.get_json(&format!("/pokemon/{segment}")).await?;
        Ok(EntityDetail::from(pokemon))
    }

    async fn category_names(&self) -> Result<Vec<String>, CatalogError> {
        let response: TypeListResponse = self.get_json("/type").await?;
        Ok(response.results.into_iter().map(|t| t.name).collect())
    }

    async fn category(&self, name: &str) -> Result<CategoryMembership, CatalogError> {
        let segment = urlencoding::encode(&name.to_lowercase()).into_owned();
        let response: TypeResponse = self.get_json(&format!("/type/{segment}")).await?;
        Ok(CategoryMembership::from(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, PokeApiClient) {
        let server = MockServer::start().await;
        let client = PokeApiClient::with_client(reqwest::Client::new(), server.uri());
        (server, client)
    }

    fn pokemon_json(id: u32, name: &str, kind: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "height": 7,
            "weight": 69,
            "types": [{"slot": 1, "type": {"name": kind, "url": "https://pokeapi.co/api/v2/type/12/"}}],
            "sprites": {"front_default": format!("https://img/{id}.png"), "other": {}},
            "abilities": [],
            "stats": []
        })
    }

    #[tokio::test]
    async fn test_list_page_passes_offset_and_limit() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .and(query_param("offset", "40"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1302,
                "next": null,
                "previous": null,
                "results": [{"name": "nidoking", "url": "https://pokeapi.co/api/v2/pokemon/34/"}]
            })))
            .mount(&server)
            .await;

        let page = client.list_page(40, 20).await.unwrap();

        assert_eq!(page.total_count, 1302);
        assert_eq!(page.ids().unwrap(), vec![34]);
    }

    #[tokio::test]
    async fn test_entity_by_id_and_name() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/pokemon/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_json(1, "bulbasaur", "grass")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon/bulbasaur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_json(1, "bulbasaur", "grass")))
            .mount(&server)
            .await;

        let by_id = client.entity(&EntityRef::Id(1)).await.unwrap();
        let by_name = client
            .entity(&EntityRef::Name("bulbasaur".to_string()))
            .await
            .unwrap();

        assert_eq!(by_id, by_name);
        assert_eq!(by_id.categories, vec!["grass"]);
    }

    #[tokio::test]
    async fn test_404_maps_to_not_found() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/pokemon/99999"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let err = client.entity(&EntityRef::Id(99999)).await.unwrap_err();
        assert_eq!(err, CatalogError::not_found("pokemon/99999"));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_network_failure() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/type"))
            .respond_with(ResponseTemplate::new(503).set_body_string("{\"results\": []}"))
            .mount(&server)
            .await;

        let err = client.category_names().await.unwrap_err();
        assert!(
            matches!(&err, CatalogError::NetworkFailure { reason, .. } if reason.contains("503")),
            "expected NetworkFailure, got: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_unexpected_body_maps_to_decode() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/type/fire"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;

        let err = client.category("fire").await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_category_membership_and_names() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "results": [
                    {"name": "normal", "url": "https://pokeapi.co/api/v2/type/1/"},
                    {"name": "fire", "url": "https://pokeapi.co/api/v2/type/10/"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/type/fire"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "fire",
                "pokemon": [
                    {"pokemon": {"name": "charmander", "url": "https://pokeapi.co/api/v2/pokemon/4/"}, "slot": 1},
                    {"pokemon": {"name": "charmeleon", "url": "https://pokeapi.co/api/v2/pokemon/5/"}, "slot": 1}
                ]
            })))
            .mount(&server)
            .await;

        assert_eq!(client.category_names().await.unwrap(), vec!["normal", "fire"]);

        let membership = client.category("FIRE").await.unwrap();
        assert_eq!(membership.category_name, "fire");
        assert_eq!(membership.ids().unwrap(), vec![4, 5]);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_failure() {
        let client = PokeApiClient::with_client(reqwest::Client::new(), "http://127.0.0.1:1/");
        let err = client.list_page(0, 20).await.unwrap_err();
        assert!(matches!(err, CatalogError::NetworkFailure { .. }));
    }
}
