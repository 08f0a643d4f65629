use serde::Serialize;

/// A pre-signed direct-upload URL for the external media host.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadUrlResponse {
    #[schema(
        example = "https://media.example.com/demo/auto/upload?api_key=key&timestamp=1700000000&signature=ab12"
    )]
    pub url: String,
}
