//! Speech: intent parsing and synthesis.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::json;

use smart_home_common::{ApiResponse, VoiceCommand};

use super::{extract, respond, send};
use crate::client::DeviceGatewayClient;
use crate::error::Result;

/// Container format browsers record in by default.
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

impl DeviceGatewayClient {
    /// `POST /api/voice/process` with the recording in the multipart field `audio`.
    pub async fn process_voice_command(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> ApiResponse<VoiceCommand> {
        let result: Result<VoiceCommand> = async {
            let part = Part::bytes(audio)
                .file_name("recording")
                .mime_str(mime_type)?;
            let form = Form::new().part("audio", part);

            let url = self.endpoint(&["api", "voice", "process"])?;
            let response = send(self.http_client.post(url).multipart(form)).await?;
            let body = response.json().await?;
            extract(body, "command")
        }
        .await;
        respond("process_voice_command", result)
    }

    /// `POST /api/voice/speak`. The data is the synthesized audio.
    pub async fn speak(&self, text: &str) -> ApiResponse<Bytes> {
        let result: Result<Bytes> = async {
            let url = self.endpoint(&["api", "voice", "speak"])?;
            let request = self.http_client.post(url).json(&json!({ "text": text }));
            let audio = send(request).await?.bytes().await?;
            tracing::debug!("Received {} bytes of speech", audio.len());
            Ok(audio)
        }
        .await;
        respond("speak", result)
    }
}
