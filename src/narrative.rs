//! Dialogue and description lookups
//!
//! The simulation only reports *what* the player asked about (a [`Topic`]).
//! Turning that into display text is the job of a [`Narrator`], which may be a
//! static table or something slow and fallible. The [`NarrativeDesk`] runs
//! lookups off the frame loop and hands back only the answer to the most
//! recent question.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::sim::WasteCategory;

/// Title used for sign text
pub const SIGN_TITLE: &str = "Did you know?";
/// Shown when inspect finds no box in range
pub const NOTHING_NEARBY: &str = "No waste nearby.";

const HEADMAN: &str = "Village Headman";

/// What the player asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Talking to the village headman
    Villager,
    /// Inspecting a box of this category
    Waste(WasteCategory),
}

impl Topic {
    /// Text shown when the narrator cannot answer
    pub fn fallback(self) -> Narration {
        match self {
            Topic::Villager => Narration::new(
                HEADMAN,
                "Village Headman: I am having trouble remembering right now.",
            ),
            Topic::Waste(category) => Narration::new(
                bin_title(category),
                "The mystical energies of this object are too complex to decipher right now.",
            ),
        }
    }

    /// Dialogue box title while the lookup is in flight
    pub fn loading_title(self) -> &'static str {
        match self {
            Topic::Villager => HEADMAN,
            Topic::Waste(_) => "Waste Analysis",
        }
    }
}

/// Display text for a topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub title: String,
    pub body: String,
}

impl Narration {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeError {
    /// The backing service could not be reached or failed
    Unavailable(String),
}

impl fmt::Display for NarrativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrativeError::Unavailable(reason) => write!(f, "narrator unavailable: {}", reason),
        }
    }
}

impl std::error::Error for NarrativeError {}

/// Source of dialogue and descriptions
///
/// Implementations may block; the desk never calls them on the frame loop in
/// threaded mode.
pub trait Narrator: Send + Sync {
    fn describe(&self, topic: Topic) -> Result<Narration, NarrativeError>;
}

/// Fixed text for every topic
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticNarrator;

fn bin_title(category: WasteCategory) -> &'static str {
    match category {
        WasteCategory::Hazardous => "Red Bin: Hazardous Waste",
        WasteCategory::General => "Blue Bin: General Waste",
        WasteCategory::Organic => "Green Bin: Organic Waste",
        WasteCategory::Recycle => "Yellow Bin: Recyclable Waste",
    }
}

impl Narrator for StaticNarrator {
    fn describe(&self, topic: Topic) -> Result<Narration, NarrativeError> {
        let category = match topic {
            Topic::Villager => {
                return Ok(Narration::new(
                    HEADMAN,
                    "Sorting waste is easy, little one. Remember: yellow is for recycling, \
                     green is for food scraps, blue is for general waste, and red is for \
                     dangerous things like batteries. If we all sort before we throw things \
                     away, our village will stay clean and pleasant for a long time.",
                ));
            }
            Topic::Waste(category) => category,
        };
        let body = match category {
            WasteCategory::Hazardous => {
                "Waste containing toxic, flammable or infectious material that can harm \
                 people, animals and the environment.\n\
                 Examples: flashlight batteries, light bulbs, rechargeable batteries."
            }
            WasteCategory::General => {
                "Waste that is not worth recycling or is hard to break down.\n\
                 Examples: snack wrappers, food-soiled plastic bags, foam boxes."
            }
            WasteCategory::Organic => {
                "Waste that rots and breaks down easily in nature, usually wet.\n\
                 Examples: food scraps, fruit peels, vegetable trimmings."
            }
            WasteCategory::Recycle => {
                "Leftovers that are still useful and can be processed into something new.\n\
                 Examples: glass bottles, paper, drink cans, scrap metal."
            }
        };
        Ok(Narration::new(bin_title(category), body))
    }
}

/// Ask the narrator, degrading any failure to the topic's fallback text
pub fn narrate(narrator: &dyn Narrator, topic: Topic) -> Narration {
    narrator.describe(topic).unwrap_or_else(|e| {
        log::warn!("Narration for {:?} failed: {}", topic, e);
        topic.fallback()
    })
}

/// Where lookups run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// Resolve during `request`; the answer is ready on the next `poll`
    #[default]
    Inline,
    /// Resolve on a background worker thread
    Threaded,
}

enum DeskCommand {
    Lookup { seq: u64, topic: Topic },
    Shutdown,
}

struct Worker {
    tx_cmd: Sender<DeskCommand>,
    thread: Option<JoinHandle<()>>,
}

/// Fire-and-forget lookup queue with last-write-wins delivery
///
/// Every request and every synchronous write gets a new sequence number.
/// `poll` hands back a result only if it answers the newest request; anything
/// older is silently dropped.
pub struct NarrativeDesk {
    narrator: Arc<dyn Narrator>,
    tx_result: Sender<(u64, Narration)>,
    rx_result: Receiver<(u64, Narration)>,
    worker: Option<Worker>,
    latest: u64,
    pending: bool,
}

impl NarrativeDesk {
    pub fn new(narrator: Arc<dyn Narrator>, dispatch: Dispatch) -> Self {
        let (tx_result, rx_result) = mpsc::channel();
        let worker = match dispatch {
            Dispatch::Inline => None,
            Dispatch::Threaded => spawn_worker(Arc::clone(&narrator), tx_result.clone()),
        };
        Self {
            narrator,
            tx_result,
            rx_result,
            worker,
            latest: 0,
            pending: false,
        }
    }

    /// Start a lookup and return its sequence number
    pub fn request(&mut self, topic: Topic) -> u64 {
        self.latest += 1;
        self.pending = true;
        let seq = self.latest;
        log::debug!("Narration request #{} for {:?}", seq, topic);

        let sent = self
            .worker
            .as_ref()
            .is_some_and(|w| w.tx_cmd.send(DeskCommand::Lookup { seq, topic }).is_ok());
        if !sent {
            let narration = narrate(self.narrator.as_ref(), topic);
            let _ = self.tx_result.send((seq, narration));
        }
        seq
    }

    /// Invalidate any pending lookup (a synchronous message took the slot)
    pub fn supersede(&mut self) -> u64 {
        self.latest += 1;
        self.pending = false;
        self.latest
    }

    /// Take the answer to the newest request, if it has arrived
    pub fn poll(&mut self) -> Option<Narration> {
        let mut fresh = None;
        while let Ok((seq, narration)) = self.rx_result.try_recv() {
            if seq == self.latest && self.pending {
                fresh = Some(narration);
            } else {
                log::debug!("Dropping stale narration #{} (latest #{})", seq, self.latest);
            }
        }
        if fresh.is_some() {
            self.pending = false;
        }
        fresh
    }

    /// A lookup is in flight and has not been superseded
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_threaded(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for NarrativeDesk {
    fn drop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            let _ = worker.tx_cmd.send(DeskCommand::Shutdown);
            if let Some(thread) = worker.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

fn spawn_worker(narrator: Arc<dyn Narrator>, tx_result: Sender<(u64, Narration)>) -> Option<Worker> {
    let (tx_cmd, rx_cmd) = mpsc::channel::<DeskCommand>();
    let spawned = thread::Builder::new()
        .name("narrative-worker".to_string())
        .spawn(move || worker_loop(narrator.as_ref(), rx_cmd, tx_result));

    match spawned {
        Ok(thread) => Some(Worker {
            tx_cmd,
            thread: Some(thread),
        }),
        Err(e) => {
            log::warn!("Could not start narrative worker, resolving inline: {}", e);
            None
        }
    }
}

fn worker_loop(
    narrator: &dyn Narrator,
    rx_cmd: Receiver<DeskCommand>,
    tx_result: Sender<(u64, Narration)>,
) {
    while let Ok(cmd) = rx_cmd.recv() {
        match cmd {
            DeskCommand::Lookup { seq, topic } => {
                let narration = narrate(narrator, topic);
                if tx_result.send((seq, narration)).is_err() {
                    break;
                }
            }
            DeskCommand::Shutdown => break,
        }
    }
}
