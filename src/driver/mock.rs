//! Scripted in-memory [`UiDriver`] used by facade and screen tests.

use crate::driver::traits::{
    By, DriverCapabilities, ElementHandle, Key, Locator, UiDriver, WaitMode,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Interaction recorded against the mock, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Tap(String),
    ClearAndType(String, String),
    Key(Key),
}

struct ScriptedElement {
    id: String,
    /// Highest wait mode this element satisfies (Presence < Visible < Clickable).
    satisfies: WaitMode,
    /// Number of probes before the element shows up in the tree.
    appear_after: usize,
}

#[derive(Default)]
struct MockState {
    elements: HashMap<(By, String), ScriptedElement>,
    probes: HashMap<(By, String), usize>,
    texts: HashMap<String, VecDeque<String>>,
    journal: Vec<Interaction>,
}

/// Deterministic driver stub: elements appear after a scripted number of
/// probes and every tap/type/key is journaled for assertions.
pub struct MockDriver {
    state: Mutex<MockState>,
    capabilities: DriverCapabilities,
}

fn mode_rank(mode: WaitMode) -> u8 {
    match mode {
        WaitMode::Presence => 0,
        WaitMode::Visible => 1,
        WaitMode::Clickable => 2,
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            capabilities: DriverCapabilities {
                platform: "mock".to_string(),
                device: None,
            },
        }
    }

    /// Script an element for `locator` with the given handle id.
    ///
    /// `satisfies` is the strongest condition the element ever meets;
    /// `appear_after` is how many probes return nothing before it appears.
    pub fn add_element(
        &self,
        locator: Locator,
        id: &str,
        satisfies: WaitMode,
        appear_after: usize,
    ) {
        let mut state = self.state.lock().unwrap();
        state.elements.insert(
            (locator.by, locator.value),
            ScriptedElement {
                id: id.to_string(),
                satisfies,
                appear_after,
            },
        );
    }

    /// Set the text returned by `element_text` for an element id.
    pub fn set_text(&self, id: &str, text: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .texts
            .insert(id.to_string(), VecDeque::from(vec![text.to_string()]));
    }

    /// Queue several texts for an element id; each read pops one until a
    /// single text remains, which then repeats.
    pub fn set_text_sequence(&self, id: &str, texts: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.texts.insert(
            id.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
    }

    /// How often the tree was probed for `locator`.
    pub fn probe_count(&self, locator: &Locator) -> usize {
        let state = self.state.lock().unwrap();
        state
            .probes
            .get(&(locator.by, locator.value.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn journal(&self) -> Vec<Interaction> {
        self.state.lock().unwrap().journal.clone()
    }
}

#[async_trait]
impl UiDriver for MockDriver {
    async fn try_find(&self, locator: &Locator, mode: WaitMode) -> Result<Option<ElementHandle>> {
        let mut state = self.state.lock().unwrap();
        let key = (locator.by, locator.value.clone());
        let seen = state.probes.entry(key.clone()).or_insert(0);
        *seen += 1;
        let seen = *seen;

        Ok(state.elements.get(&key).and_then(|el| {
            if seen > el.appear_after && mode_rank(mode) <= mode_rank(el.satisfies) {
                Some(ElementHandle::new(el.id.clone()))
            } else {
                None
            }
        }))
    }

    async fn tap(&self, element: &ElementHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.journal.push(Interaction::Tap(element.id.clone()));
        Ok(())
    }

    async fn element_text(&self, element: &ElementHandle) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        let queue = state.texts.get_mut(&element.id);
        match queue {
            Some(q) if q.len() > 1 => Ok(q.pop_front().unwrap()),
            Some(q) => Ok(q.front().cloned().unwrap_or_default()),
            None => Ok(String::new()),
        }
    }

    async fn clear_and_type(&self, element: &ElementHandle, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .journal
            .push(Interaction::ClearAndType(element.id.clone(), text.to_string()));
        Ok(())
    }

    async fn send_key(&self, key: Key) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.journal.push(Interaction::Key(key));
        Ok(())
    }

    fn capabilities(&self) -> &DriverCapabilities {
        &self.capabilities
    }
}
