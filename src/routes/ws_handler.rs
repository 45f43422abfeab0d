use axum::extract::ws::{Message, WebSocket};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::state::app_state::SignalInfo;

#[derive(Serialize)]
struct SamplePayload {
    x: f64,
    value: f64,
    seq: u64,
    end_flag: bool,
}

pub async fn handle_ws_fetch(mut socket: WebSocket, signal: SignalInfo) {
    let name = signal.original_name;
    info!("ws_fetch streaming started: {} (file {})", name, signal.file_id);

    let values = match signal.waveform.resolve_signal_values(&name) {
        Ok(Some(values)) => values,
        Ok(None) => {
            error!("signal not found in container: {}", name);
            return;
        }
        Err(e) => {
            error!("resolving {} failed: {}", name, e);
            return;
        }
    };

    let mut seq: u64 = 0;

    for (x, value) in signal.waveform.independent_values().iter().zip(values) {
        let payload = SamplePayload {
            x: *x,
            value,
            seq,
            end_flag: false,
        };

        let json = match serde_json::to_string(&payload) {
            Ok(j) => j,
            Err(e) => {
                error!("json serialize error: {}", e);
                return;
            }
        };

        if let Err(e) = socket.send(Message::Text(json.into())).await {
            warn!("ws send failed: {}", e);
            return;
        }

        seq += 1;
    }

    let end_payload = SamplePayload {
        x: 0.0,
        value: 0.0,
        seq,
        end_flag: true,
    };

    if let Ok(json) = serde_json::to_string(&end_payload) {
        let _ = socket.send(Message::Text(json.into())).await;
    }

    info!("ws_fetch finished: {} ({} samples)", name, seq);
}
