use anyhow::{Context, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::provider::{SttProvider, SttStream, SttStreamOptions, TranscriptBatch};
use crate::audio::AudioCodec;
use crate::transcript::TranscriptSegment;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Streaming Deepgram client: one WebSocket per provider channel.
pub struct DeepgramProvider {
    endpoint: String,
    api_key: String,
}

impl DeepgramProvider {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self { endpoint, api_key }
    }

    fn stream_url(&self, options: &SttStreamOptions) -> String {
        let encoding = match options.codec {
            AudioCodec::Pcm8 | AudioCodec::Pcm16 => "linear16",
            AudioCodec::Opus => "opus",
        };
        format!(
            "{}?model=nova-2-general&language={}&sample_rate={}&encoding={}&channels={}\
             &punctuate=true&diarize=true&interim_results=false&smart_format=true",
            self.endpoint, options.language, options.sample_rate, encoding, options.channels
        )
    }
}

#[async_trait::async_trait]
impl SttProvider for DeepgramProvider {
    async fn open_stream(
        &self,
        stream_id: u8,
        options: &SttStreamOptions,
        batches: mpsc::Sender<TranscriptBatch>,
    ) -> Result<Box<dyn SttStream>> {
        let url = self.stream_url(options);
        let mut request = url
            .clone()
            .into_client_request()
            .context("Invalid provider endpoint")?;
        request.headers_mut().insert(
            "Authorization",
            format!("Token {}", self.api_key)
                .parse()
                .context("Invalid provider credentials")?,
        );

        let (socket, _response) = connect_async(request)
            .await
            .context("Failed to connect to transcription provider")?;
        info!("Provider channel {} open ({})", stream_id, options.codec);

        let (sink, stream) = socket.split();
        tokio::spawn(read_responses(stream_id, stream, batches));

        Ok(Box::new(DeepgramStream { stream_id, sink }))
    }
}

struct DeepgramStream {
    stream_id: u8,
    sink: WsSink,
}

#[async_trait::async_trait]
impl SttStream for DeepgramStream {
    async fn send_audio(&mut self, frame: &[u8]) -> Result<()> {
        self.sink
            .send(Message::Binary(frame.to_vec()))
            .await
            .with_context(|| format!("Provider channel {} send failed", self.stream_id))
    }

    async fn finish(&mut self) -> Result<()> {
        // CloseStream makes the provider flush pending results before the
        // socket goes away.
        let _ = self
            .sink
            .send(Message::Text("{\"type\":\"CloseStream\"}".to_string()))
            .await;
        self.sink
            .close()
            .await
            .with_context(|| format!("Provider channel {} close failed", self.stream_id))
    }
}

async fn read_responses(stream_id: u8, mut stream: WsStream, batches: mpsc::Sender<TranscriptBatch>) {
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(payload)) => {
                let segments = parse_transcript(&payload);
                if segments.is_empty() {
                    continue;
                }
                if batches
                    .send(TranscriptBatch {
                        stream_id,
                        segments,
                    })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Provider channel {} read error: {}", stream_id, e);
                break;
            }
        }
    }
    debug!("Provider channel {} reader stopped", stream_id);
}

#[derive(Debug, Deserialize)]
struct DgResponse {
    channel: Option<DgChannel>,
}

#[derive(Debug, Deserialize)]
struct DgChannel {
    alternatives: Vec<DgAlternative>,
}

#[derive(Debug, Deserialize)]
struct DgAlternative {
    #[serde(default)]
    words: Vec<DgWord>,
}

#[derive(Debug, Deserialize)]
struct DgWord {
    word: String,
    start: f64,
    end: f64,
    speaker: Option<u32>,
    punctuated_word: Option<String>,
}

/// Fold the word-level diarized response into per-speaker segments.
fn parse_transcript(payload: &str) -> Vec<TranscriptSegment> {
    let response: DgResponse = match serde_json::from_str(payload) {
        Ok(response) => response,
        Err(e) => {
            debug!("Skipping unparseable provider message: {}", e);
            return Vec::new();
        }
    };

    let words = match response
        .channel
        .and_then(|c| c.alternatives.into_iter().next())
    {
        Some(alternative) => alternative.words,
        None => return Vec::new(),
    };

    let mut segments: Vec<TranscriptSegment> = Vec::new();
    for word in words {
        let speaker_index = word.speaker.unwrap_or(0);
        let speaker = format!("SPEAKER_{:02}", speaker_index);
        let text = word.punctuated_word.unwrap_or(word.word);

        match segments.last_mut() {
            Some(last) if last.speaker == speaker => {
                last.text.push(' ');
                last.text.push_str(&text);
                last.end = Some(word.end);
            }
            _ => segments.push(TranscriptSegment {
                speaker,
                is_user: speaker_index == 0,
                text,
                start: word.start,
                end: Some(word.end),
            }),
        }
    }

    segments
}
