//! Pure translation from [`UiState`] to display instructions.
//!
//! Front ends implement [`RenderTarget`] and apply the instructions to
//! whatever widgets they own. [`DisplayModel`] folds instructions into a
//! plain snapshot and is what the terminal front end and the tests use.

use std::sync::Mutex;

use serde::Serialize;

use crate::client::AnalysisResponse;
use crate::messages;
use crate::state::UiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Loading,
    Result,
    Error,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Loading, Region::Result, Region::Error];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSlot {
    LoadingMessage,
    ErrorMessage,
    Sentiment,
    Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSlot {
    GoodNews,
    BadNews,
    KeyPromises,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentTone {
    Positive,
    Negative,
    Neutral,
    Informational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAlign {
    Start,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub text: String,
    /// Muted/italic filler shown when the backend sent nothing.
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderInstruction {
    SetVisible { region: Region, visible: bool },
    SetSubmitControl { enabled: bool, label: &'static str, spinner: bool },
    SetText { slot: TextSlot, text: String },
    SetSentimentTone { tone: Option<SentimentTone> },
    SetList { slot: ListSlot, items: Vec<ListItem> },
    ScrollIntoView { region: Region, align: ScrollAlign },
}

/// Applies instruction batches to a concrete UI.
pub trait RenderTarget: Send + Sync {
    fn apply(&self, instructions: &[RenderInstruction]);
}

pub fn sentiment_tone(label: &str) -> SentimentTone {
    fn has(lower: &str, words: &[&str]) -> bool {
        words.iter().any(|w| lower.contains(*w))
    }
    let lower = label.to_lowercase();
    if has(&lower, &["positive", "bullish", "optimistic"]) {
        SentimentTone::Positive
    } else if has(&lower, &["negative", "bearish", "pessimistic"]) {
        SentimentTone::Negative
    } else if has(&lower, &["neutral", "mixed"]) {
        SentimentTone::Neutral
    } else {
        SentimentTone::Informational
    }
}

/// Full description of the display for `state`.
///
/// Every batch sets the visibility of all three regions, hides before it
/// shows, and carries the submit control, so applying it to any prior
/// display yields the same result.
pub fn render(state: &UiState) -> Vec<RenderInstruction> {
    let shown = match state {
        UiState::Idle => None,
        UiState::Loading { .. } => Some(Region::Loading),
        UiState::Result(_) => Some(Region::Result),
        UiState::Error(_) => Some(Region::Error),
    };

    let mut out: Vec<RenderInstruction> = Region::ALL
        .iter()
        .filter(|r| Some(**r) != shown)
        .map(|r| RenderInstruction::SetVisible { region: *r, visible: false })
        .collect();

    let busy = state.is_loading();
    out.push(RenderInstruction::SetSubmitControl {
        enabled: !busy,
        label: if busy { messages::SUBMIT_LABEL_BUSY } else { messages::SUBMIT_LABEL_READY },
        spinner: busy,
    });

    match state {
        UiState::Idle => {}
        UiState::Loading { .. } => {
            let text = state.loading_message().unwrap_or(messages::LOADING_MESSAGES[0]);
            out.push(RenderInstruction::SetText {
                slot: TextSlot::LoadingMessage,
                text: text.to_string(),
            });
        }
        UiState::Result(resp) => render_result(resp, &mut out),
        UiState::Error(message) => {
            out.push(RenderInstruction::SetText {
                slot: TextSlot::ErrorMessage,
                text: message.clone(),
            });
        }
    }

    if let Some(region) = shown {
        out.push(RenderInstruction::SetVisible { region, visible: true });
        match region {
            Region::Result => out.push(RenderInstruction::ScrollIntoView {
                region,
                align: ScrollAlign::Start,
            }),
            Region::Error => out.push(RenderInstruction::ScrollIntoView {
                region,
                align: ScrollAlign::Center,
            }),
            Region::Loading => {}
        }
    }
    out
}

fn render_result(resp: &AnalysisResponse, out: &mut Vec<RenderInstruction>) {
    let sentiment = resp.sentiment.as_deref().filter(|s| !s.is_empty());
    out.push(RenderInstruction::SetText {
        slot: TextSlot::Sentiment,
        text: sentiment.unwrap_or(messages::SENTIMENT_PLACEHOLDER).to_string(),
    });
    out.push(RenderInstruction::SetSentimentTone {
        tone: sentiment.map(sentiment_tone),
    });

    let lists = [
        (ListSlot::GoodNews, &resp.good_news),
        (ListSlot::BadNews, &resp.bad_news),
        (ListSlot::KeyPromises, &resp.key_promises),
    ];
    for (slot, items) in lists {
        out.push(RenderInstruction::SetList { slot, items: list_items(items.as_deref()) });
    }

    let verdict = resp.verdict.as_deref().filter(|s| !s.is_empty());
    out.push(RenderInstruction::SetText {
        slot: TextSlot::Verdict,
        text: verdict.unwrap_or(messages::VERDICT_PLACEHOLDER).to_string(),
    });
}

fn list_items(items: Option<&[String]>) -> Vec<ListItem> {
    match items {
        Some(items) if !items.is_empty() => items
            .iter()
            .map(|text| ListItem { text: text.clone(), placeholder: false })
            .collect(),
        _ => vec![ListItem {
            text: messages::EMPTY_LIST_PLACEHOLDER.to_string(),
            placeholder: true,
        }],
    }
}

/// Plain snapshot of a display after a sequence of instruction batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayModel {
    pub loading_visible: bool,
    pub result_visible: bool,
    pub error_visible: bool,
    pub submit_enabled: bool,
    pub submit_label: String,
    pub spinner_visible: bool,
    pub loading_message: String,
    pub error_message: String,
    pub sentiment: String,
    pub sentiment_tone: Option<SentimentTone>,
    pub good_news: Vec<ListItem>,
    pub bad_news: Vec<ListItem>,
    pub key_promises: Vec<ListItem>,
    pub verdict: String,
    pub last_scroll: Option<(Region, ScrollAlign)>,
}

impl DisplayModel {
    pub fn apply(&mut self, instructions: &[RenderInstruction]) {
        for ins in instructions {
            match ins {
                RenderInstruction::SetVisible { region, visible } => {
                    *self.visible_mut(*region) = *visible;
                }
                RenderInstruction::SetSubmitControl { enabled, label, spinner } => {
                    self.submit_enabled = *enabled;
                    self.submit_label = label.to_string();
                    self.spinner_visible = *spinner;
                }
                RenderInstruction::SetText { slot, text } => {
                    let field = match slot {
                        TextSlot::LoadingMessage => &mut self.loading_message,
                        TextSlot::ErrorMessage => &mut self.error_message,
                        TextSlot::Sentiment => &mut self.sentiment,
                        TextSlot::Verdict => &mut self.verdict,
                    };
                    *field = text.clone();
                }
                RenderInstruction::SetSentimentTone { tone } => self.sentiment_tone = *tone,
                RenderInstruction::SetList { slot, items } => {
                    let field = match slot {
                        ListSlot::GoodNews => &mut self.good_news,
                        ListSlot::BadNews => &mut self.bad_news,
                        ListSlot::KeyPromises => &mut self.key_promises,
                    };
                    *field = items.clone();
                }
                RenderInstruction::ScrollIntoView { region, align } => {
                    self.last_scroll = Some((*region, *align));
                }
            }
        }
    }

    pub fn is_visible(&self, region: Region) -> bool {
        match region {
            Region::Loading => self.loading_visible,
            Region::Result => self.result_visible,
            Region::Error => self.error_visible,
        }
    }

    pub fn visible_regions(&self) -> Vec<Region> {
        Region::ALL.into_iter().filter(|r| self.is_visible(*r)).collect()
    }

    fn visible_mut(&mut self, region: Region) -> &mut bool {
        match region {
            Region::Loading => &mut self.loading_visible,
            Region::Result => &mut self.result_visible,
            Region::Error => &mut self.error_visible,
        }
    }
}

/// Target that only remembers what it was told.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    model: Mutex<DisplayModel>,
    batches: Mutex<Vec<Vec<RenderInstruction>>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DisplayModel {
        self.model.lock().expect("display model mutex poisoned").clone()
    }

    pub fn batches(&self) -> Vec<Vec<RenderInstruction>> {
        self.batches.lock().expect("batch log mutex poisoned").clone()
    }
}

impl RenderTarget for RecordingTarget {
    fn apply(&self, instructions: &[RenderInstruction]) {
        self.model
            .lock()
            .expect("display model mutex poisoned")
            .apply(instructions);
        self.batches
            .lock()
            .expect("batch log mutex poisoned")
            .push(instructions.to_vec());
    }
}
