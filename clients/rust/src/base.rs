use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use taskflow_api_structs::send_task_reminders::TRIGGER_KEY_HEADER;

pub(crate) struct BaseClient {
    address: String,
    trigger_key: Option<String>,
    client: Client,
}

#[derive(Debug)]
pub enum APIError {
    Network,
    MalformedResponse,
    UnexpectedStatusCode(StatusCode),
}
pub type APIResponse<T> = Result<T, APIError>;

impl BaseClient {
    pub fn new(address: String) -> Self {
        Self {
            address,
            trigger_key: None,
            client: Client::new(),
        }
    }

    pub fn set_trigger_key(&mut self, trigger_key: String) {
        self.trigger_key = Some(trigger_key);
    }

    fn get_client(&self, method: Method, path: String) -> RequestBuilder {
        let url = format!("{}/{}", self.address, path);
        let builder = self.client.request(method, &url);

        if let Some(trigger_key) = &self.trigger_key {
            builder.header(TRIGGER_KEY_HEADER, trigger_key.clone())
        } else {
            builder
        }
    }

    fn check_status_code(&self, res: &Response, expected_status_code: StatusCode) -> Result<(), APIError> {
        let status = res.status();
        if status != expected_status_code {
            return Err(APIError::UnexpectedStatusCode(status));
        }
        Ok(())
    }

    async fn handle_api_response<T: for<'de> Deserialize<'de>>(
        &self,
        res: Response,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        self.check_status_code(&res, expected_status_code)?;
        res.json::<T>()
            .await
            .map_err(|_| APIError::MalformedResponse)
    }

    pub async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = match self.get_client(Method::GET, path).send().await {
            Ok(res) => res,
            Err(_) => return Err(APIError::Network),
        };
        self.handle_api_response(res, expected_status_code).await
    }

    /// Post without a request body
    pub async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = match self.get_client(Method::POST, path).send().await {
            Ok(res) => res,
            Err(_) => return Err(APIError::Network),
        };
        self.handle_api_response(res, expected_status_code).await
    }
}
