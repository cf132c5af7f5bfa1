//! Battle link - sequenced JSON messages between two players
//!
//! Messages travel as one JSON document per line over tokio unbounded channels, so a
//! socket transport can carry the exact same lines. The game loop stays synchronous and
//! drains its inbox with [`BattleLink::try_recv`] once per frame; async callers may use
//! [`BattleLink::recv`].
//!
//! Every message carries a per-sender `seq`. Replayed or stale lines (seq not greater than
//! the last one accepted) are dropped with a warning.

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("battle link closed")]
    Closed,
    #[error("malformed battle message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleBody {
    /// Garbage lines the receiver must insert
    LinesSent { lines: u32 },
    /// Sender's running totals, for the opponent pane
    Progress { lines: u32, score: u32 },
    /// Sender topped out or was knocked out
    KnockedOut,
}

/// One line on the wire: `{"seq":3,"type":"lines_sent","lines":2}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleMessage {
    pub seq: u64,
    #[serde(flatten)]
    pub body: BattleBody,
}

impl BattleMessage {
    pub fn to_line(&self) -> Result<String, LinkError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> Result<Self, LinkError> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

/// One endpoint of a two-player link
#[derive(Debug)]
pub struct BattleLink {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
    next_seq: u64,
    last_seen: u64,
}

impl BattleLink {
    /// Two connected endpoints
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel::<String>();
        let (b_tx, b_rx) = mpsc::unbounded_channel::<String>();
        (Self::from_channels(a_tx, b_rx), Self::from_channels(b_tx, a_rx))
    }

    /// Wrap raw line channels, e.g. ones fed by a socket task
    pub fn from_channels(
        tx: mpsc::UnboundedSender<String>,
        rx: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        Self {
            tx,
            rx,
            next_seq: 1,
            last_seen: 0,
        }
    }

    /// Send a payload; returns the sequence number used
    pub fn send(&mut self, body: BattleBody) -> Result<u64, LinkError> {
        let seq = self.next_seq;
        let line = BattleMessage { seq, body }.to_line()?;
        self.tx.send(line).map_err(|_| LinkError::Closed)?;
        self.next_seq += 1;
        Ok(seq)
    }

    /// Next in-order message without blocking, `Ok(None)` when the inbox is empty
    pub fn try_recv(&mut self) -> Result<Option<BattleMessage>, LinkError> {
        loop {
            let line = match self.rx.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(LinkError::Closed),
            };
            if let Some(msg) = self.accept(&line)? {
                return Ok(Some(msg));
            }
        }
    }

    /// Wait for the next in-order message
    pub async fn recv(&mut self) -> Result<BattleMessage, LinkError> {
        loop {
            let line = self.rx.recv().await.ok_or(LinkError::Closed)?;
            if let Some(msg) = self.accept(&line)? {
                return Ok(msg);
            }
        }
    }

    fn accept(&mut self, line: &str) -> Result<Option<BattleMessage>, LinkError> {
        let msg = BattleMessage::from_line(line)?;
        if msg.seq <= self.last_seen {
            warn!("dropping stale battle message seq {} (last {})", msg.seq, self.last_seen);
            return Ok(None);
        }
        self.last_seen = msg.seq;
        Ok(Some(msg))
    }
}
