use super::component::BootstrapComponent;

/// Order components by ascending priority.
///
/// The sort is stable, so components with equal priority keep the order
/// their discovery strategy produced. Both phases use the returned order.
pub fn schedule(mut components: Vec<BootstrapComponent>) -> Vec<BootstrapComponent> {
    components.sort_by_key(BootstrapComponent::priority);
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(components: &[BootstrapComponent]) -> Vec<&str> {
        components.iter().map(|c| c.name()).collect()
    }

    #[test]
    fn lower_priority_runs_first() {
        let scheduled = schedule(vec![
            BootstrapComponent::new("Y".into(), 20),
            BootstrapComponent::new("X".into(), 10),
        ]);
        assert_eq!(names(&scheduled), vec!["X", "Y"]);
    }

    #[test]
    fn ties_keep_discovery_order() {
        let scheduled = schedule(vec![
            BootstrapComponent::new("b".into(), 1000),
            BootstrapComponent::new("first".into(), -5),
            BootstrapComponent::new("a".into(), 1000),
            BootstrapComponent::new("c".into(), 1000),
        ]);
        assert_eq!(names(&scheduled), vec!["first", "b", "a", "c"]);
    }
}
