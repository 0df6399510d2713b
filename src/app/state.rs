use super::{ComponentState, GesturenavApp};
use std::collections::HashMap;
use tracing::debug;

impl GesturenavApp {
    pub async fn set_component_state(&self, component: &str, state: ComponentState) {
        let mut states = self.component_states.lock().await;
        debug!("Component '{}' state changed to: {:?}", component, state);
        states.insert(component.to_string(), state);
    }

    pub async fn get_component_state(&self, component: &str) -> Option<ComponentState> {
        self.component_states.lock().await.get(component).cloned()
    }

    pub async fn get_all_component_states(&self) -> HashMap<String, ComponentState> {
        self.component_states.lock().await.clone()
    }

    /// Components that are neither running nor stopped cleanly
    pub async fn unhealthy_components(&self) -> Vec<String> {
        let states = self.component_states.lock().await;
        let mut unhealthy: Vec<String> = states
            .iter()
            .filter(|(_, state)| matches!(state, ComponentState::Degraded | ComponentState::Failed))
            .map(|(name, _)| name.clone())
            .collect();
        unhealthy.sort();
        unhealthy
    }
}
