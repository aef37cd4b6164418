//! WebRTC transport to the realtime endpoint.
//!
//! One `RtcPeerConnection` carries the microphone track out, the agent's
//! voice back, and an `oai-events` data channel for JSON events. Browser
//! callbacks are forwarded into a single unbounded channel so the session
//! sees them in delivery order.

use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use gloo_net::http::Request;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AnalyserNode, AudioContext, AudioContextState, HtmlAudioElement, MediaStream,
    MediaStreamAudioSourceNode, MediaStreamConstraints, MediaStreamTrack, MessageEvent,
    RtcDataChannel, RtcDataChannelState, RtcIceConnectionState, RtcPeerConnection, RtcSdpType,
    RtcSessionDescriptionInit, RtcTrackEvent,
};

use voice_core::ports::{AudioPipeline, ChannelEvent, Connection, RealtimeLink, TransportPort};
use voice_types::{
    AgentError, Result,
    config::RealtimeConfig,
    session::{CandidatePairStats, SessionCredential},
};

use crate::js_err;

pub struct WebRtcTransport {
    config: RealtimeConfig,
    fft_size: u32,
}

impl WebRtcTransport {
    pub fn new(config: RealtimeConfig, fft_size: u32) -> Self {
        Self { config, fft_size }
    }

    fn offer_url(&self, model: &str) -> String {
        let model: String = js_sys::encode_uri_component(model).into();
        format!("{}?model={}", self.config.url, model)
    }

    async fn negotiate(&self, pc: &RtcPeerConnection, credential: &SessionCredential) -> Result<()> {
        let offer = JsFuture::from(pc.create_offer())
            .await
            .map_err(|e| js_err("createOffer", e))?;
        let sdp = js_sys::Reflect::get(&offer, &JsValue::from_str("sdp"))
            .ok()
            .and_then(|sdp| sdp.as_string())
            .unwrap_or_default();
        JsFuture::from(pc.set_local_description(offer.unchecked_ref()))
            .await
            .map_err(|e| js_err("setLocalDescription", e))?;

        let response = Request::post(&self.offer_url(&credential.model))
            .header("Authorization", &format!("Bearer {}", credential.client_secret.value))
            .header("Content-Type", "application/sdp")
            .body(sdp)
            .map_err(|e| AgentError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;

        if !response.ok() {
            log::warn!("SDP exchange returned HTTP {}", response.status());
            return Err(AgentError::Transport(
                "Failed to negotiate realtime session".to_string(),
            ));
        }

        let answer_sdp = response
            .text()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;
        let answer = RtcSessionDescriptionInit::new(RtcSdpType::Answer);
        answer.set_sdp(&answer_sdp);
        JsFuture::from(pc.set_remote_description(&answer))
            .await
            .map_err(|e| js_err("setRemoteDescription", e))?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl TransportPort for WebRtcTransport {
    async fn connect(&self, credential: &SessionCredential) -> Result<Connection> {
        let pc = RtcPeerConnection::new().map_err(|e| js_err("RTCPeerConnection", e))?;
        let (events, receiver) = mpsc::unbounded::<ChannelEvent>();

        let remote_audio = HtmlAudioElement::new().map_err(|e| js_err("Audio element", e))?;
        remote_audio.set_autoplay(true);
        attach_peer_handlers(&pc, &remote_audio, events.clone());

        let channel = pc.create_data_channel(&self.config.data_channel_label);
        attach_channel_handlers(&channel, events);

        let link = Rc::new(RtcLink {
            pc: pc.clone(),
            channel,
            remote_audio,
        });

        let microphone = match open_microphone().await {
            Ok(stream) => stream,
            Err(e) => {
                link.close();
                return Err(e);
            }
        };
        for track in microphone.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                pc.add_track_0(&track, &microphone);
            }
        }
        let audio = Rc::new(MicrophonePipeline::new(microphone, self.fft_size).await);

        if let Err(e) = self.negotiate(&pc, credential).await {
            audio.release();
            link.close();
            return Err(e);
        }

        log::info!("WebRTC negotiation complete");
        Ok(Connection {
            link,
            audio,
            events: receiver.boxed_local(),
        })
    }
}

fn attach_peer_handlers(
    pc: &RtcPeerConnection,
    remote_audio: &HtmlAudioElement,
    events: mpsc::UnboundedSender<ChannelEvent>,
) {
    let audio = remote_audio.clone();
    let ontrack = Closure::wrap(Box::new(move |event: RtcTrackEvent| {
        let Some(stream) = event.streams().get(0).dyn_into::<MediaStream>().ok() else {
            return;
        };
        audio.set_src_object(Some(&stream));
        if let Ok(playing) = audio.play() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(playing).await {
                    log::warn!("Autoplay failed: {:?}", e);
                }
            });
        }
    }) as Box<dyn FnMut(RtcTrackEvent)>);
    pc.set_ontrack(Some(ontrack.as_ref().unchecked_ref()));
    ontrack.forget();

    let peer = pc.clone();
    let onstatechange = Closure::wrap(Box::new(move || {
        let state = peer.ice_connection_state();
        log::debug!("ICE connection state: {:?}", state);
        let event = match state {
            RtcIceConnectionState::Connected | RtcIceConnectionState::Completed => ChannelEvent::Connected,
            RtcIceConnectionState::Failed => ChannelEvent::Failed("Connection failed".to_string()),
            RtcIceConnectionState::Disconnected | RtcIceConnectionState::Closed => {
                ChannelEvent::Disconnected
            }
            _ => return,
        };
        let _ = events.unbounded_send(event);
    }) as Box<dyn FnMut()>);
    pc.set_oniceconnectionstatechange(Some(onstatechange.as_ref().unchecked_ref()));
    onstatechange.forget();
}

fn attach_channel_handlers(channel: &RtcDataChannel, events: mpsc::UnboundedSender<ChannelEvent>) {
    let tx = events.clone();
    let onopen = Closure::wrap(Box::new(move || {
        let _ = tx.unbounded_send(ChannelEvent::Opened);
    }) as Box<dyn FnMut()>);
    channel.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let tx = events.clone();
    let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
        match event.data().as_string() {
            Some(frame) => {
                let _ = tx.unbounded_send(ChannelEvent::Message(frame));
            }
            None => log::warn!("Ignoring non-text data channel frame"),
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    channel.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let onclose = Closure::wrap(Box::new(move || {
        let _ = events.unbounded_send(ChannelEvent::Closed);
    }) as Box<dyn FnMut()>);
    channel.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();
}

async fn open_microphone() -> Result<MediaStream> {
    let window = web_sys::window().ok_or_else(|| AgentError::JsInterop("No window".to_string()))?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|e| js_err("mediaDevices", e))?;

    let audio = js_sys::Object::new();
    for (key, value) in [
        ("channelCount", JsValue::from(1)),
        ("echoCancellation", JsValue::TRUE),
        ("noiseSuppression", JsValue::TRUE),
        ("autoGainControl", JsValue::TRUE),
    ] {
        js_sys::Reflect::set(&audio, &JsValue::from_str(key), &value)
            .map_err(|e| js_err("audio constraints", e))?;
    }
    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&audio);

    let request = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| js_err("getUserMedia", e))?;
    let stream = JsFuture::from(request)
        .await
        .map_err(|e| js_err("getUserMedia", e))?;
    stream
        .dyn_into::<MediaStream>()
        .map_err(|e| js_err("getUserMedia", e))
}

// ─── Link ────────────────────────────────────────────────────

pub struct RtcLink {
    pc: RtcPeerConnection,
    channel: RtcDataChannel,
    remote_audio: HtmlAudioElement,
}

#[async_trait(?Send)]
impl RealtimeLink for RtcLink {
    fn send(&self, frame: &str) -> Result<()> {
        if !self.is_open() {
            return Err(AgentError::ChannelNotReady);
        }
        self.channel
            .send_with_str(frame)
            .map_err(|e| js_err("RTCDataChannel.send", e))
    }

    fn is_open(&self) -> bool {
        self.channel.ready_state() == RtcDataChannelState::Open
    }

    async fn candidate_pairs(&self) -> Result<Vec<CandidatePairStats>> {
        let report = JsFuture::from(self.pc.get_stats())
            .await
            .map_err(|e| js_err("getStats", e))?;
        let report: js_sys::Map = report.unchecked_into();

        let mut pairs = Vec::new();
        report.for_each(&mut |entry, _id| {
            if string_field(&entry, "type").as_deref() != Some("candidate-pair") {
                return;
            }
            pairs.push(CandidatePairStats {
                succeeded: string_field(&entry, "state").as_deref() == Some("succeeded"),
                current_round_trip_time: js_sys::Reflect::get(&entry, &JsValue::from_str("currentRoundTripTime"))
                    .ok()
                    .and_then(|rtt| rtt.as_f64()),
            });
        });
        Ok(pairs)
    }

    fn close(&self) {
        self.channel.set_onopen(None);
        self.channel.set_onmessage(None);
        self.channel.set_onclose(None);
        self.pc.set_ontrack(None);
        self.pc.set_oniceconnectionstatechange(None);
        self.channel.close();
        self.pc.close();
        self.remote_audio.set_src_object(None);
    }
}

fn string_field(value: &JsValue, key: &str) -> Option<String> {
    js_sys::Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .and_then(|field| field.as_string())
}

// ─── Microphone ──────────────────────────────────────────────

/// Local microphone capture plus an analyser for the level meter.
///
/// The analyser is optional: if the audio graph cannot be built the
/// session still runs, only the level meter stays silent.
pub struct MicrophonePipeline {
    stream: MediaStream,
    graph: Option<AnalyserGraph>,
}

struct AnalyserGraph {
    context: AudioContext,
    source: MediaStreamAudioSourceNode,
    analyser: AnalyserNode,
}

impl MicrophonePipeline {
    pub async fn new(stream: MediaStream, fft_size: u32) -> Self {
        let graph = match AnalyserGraph::build(&stream, fft_size).await {
            Ok(graph) => Some(graph),
            Err(e) => {
                log::warn!("Unable to start level monitor: {}", e);
                None
            }
        };
        Self { stream, graph }
    }
}

impl AnalyserGraph {
    async fn build(stream: &MediaStream, fft_size: u32) -> Result<Self> {
        let context = AudioContext::new().map_err(|e| js_err("AudioContext", e))?;
        if context.state() == AudioContextState::Suspended {
            let resume = context.resume().map_err(|e| js_err("AudioContext.resume", e))?;
            JsFuture::from(resume)
                .await
                .map_err(|e| js_err("AudioContext.resume", e))?;
        }

        let source = context
            .create_media_stream_source(stream)
            .map_err(|e| js_err("createMediaStreamSource", e))?;
        let analyser = context
            .create_analyser()
            .map_err(|e| js_err("createAnalyser", e))?;
        analyser.set_fft_size(fft_size);
        source
            .connect_with_audio_node(&analyser)
            .map_err(|e| js_err("connect analyser", e))?;

        Ok(Self {
            context,
            source,
            analyser,
        })
    }
}

impl AudioPipeline for MicrophonePipeline {
    fn window_size(&self) -> usize {
        self.graph
            .as_ref()
            .map(|graph| graph.analyser.fft_size() as usize)
            .unwrap_or(0)
    }

    fn read_waveform(&self, window: &mut [f32]) -> Result<()> {
        let graph = self
            .graph
            .as_ref()
            .ok_or_else(|| AgentError::JsInterop("No analyser attached".to_string()))?;
        graph.analyser.get_float_time_domain_data(window);
        Ok(())
    }

    fn release(&self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        if let Some(graph) = &self.graph {
            let _ = graph.source.disconnect();
            let _ = graph.context.close();
        }
    }
}
