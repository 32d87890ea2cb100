#![forbid(unsafe_code)]

//! Tooltip behaviour as seen by a hosting page.
//!
//! Proves that:
//! 1. The bubble appears on pointer-enter with the attribute text and goes
//!    away on pointer-leave.
//! 2. Attribute edits reach the next bubble but never an already rendered one.
//! 3. Detachment releases exactly the two icon listeners, on every path.
//! 4. The styling hooks resolve through the shadow boundary as documented.
//! 5. Registration is once per host, and late definitions upgrade.
//!
//! Run:
//!   cargo test -p tipkit-widgets --test tooltip_scenarios

use pretty_assertions::assert_eq;
use tipkit_dom::{NodeId, PointerEventKind, computed_style};
use tipkit_runtime::{DEFAULT_REACTION_CAPACITY, Host, HostError, ReactionKind, RegistryError};
use tipkit_widgets::tooltip::{
    self, TOOLTIP_TAG, TOOLTIP_TEXT_ATTRIBUTE, TooltipConfig, TooltipWidget,
};

struct Page {
    host: Host,
    body: NodeId,
}

impl Page {
    fn new() -> Self {
        let mut host = Host::new();
        tooltip::define(&mut host).expect("first definition succeeds");
        let body = host.create_element("body");
        let root = host.document().root();
        host.append_child(root, body).expect("body attaches");
        Self { host, body }
    }

    fn tooltip(&mut self, text: Option<&str>) -> NodeId {
        let el = self.host.create_element(TOOLTIP_TAG);
        if let Some(text) = text {
            self.host
                .set_attribute(el, TOOLTIP_TEXT_ATTRIBUTE, text)
                .expect("attribute set");
        }
        self.host.append_child(self.body, el).expect("tooltip attaches");
        el
    }

    fn widget(&self, el: NodeId) -> &TooltipWidget {
        self.host
            .element::<TooltipWidget>(el)
            .expect("tooltip is upgraded")
    }

    fn icon(&self, el: NodeId) -> NodeId {
        self.widget(el).icon().expect("icon located on attach")
    }

    fn enter(&mut self, el: NodeId) {
        let icon = self.icon(el);
        self.host.dispatch_pointer(icon, PointerEventKind::Enter);
    }

    fn leave(&mut self, el: NodeId) {
        let icon = self.icon(el);
        self.host.dispatch_pointer(icon, PointerEventKind::Leave);
    }

    fn bubbles(&self, el: NodeId) -> Vec<NodeId> {
        let shadow = self.widget(el).shadow_root().expect("shadow root");
        self.host
            .document()
            .query_selector_all(shadow, "div")
            .expect("valid selector")
    }

    fn bubble_text(&self, el: NodeId) -> Option<String> {
        let bubble = self.widget(el).bubble(self.host.document())?;
        Some(self.host.document().text_content(bubble))
    }
}

// ============================================================================
// 1. Show and hide
// ============================================================================

#[test]
fn hello_world_scenario() {
    let mut page = Page::new();
    let el = page.tooltip(Some("Hello"));
    assert_eq!(page.bubble_text(el), None);

    page.enter(el);
    assert_eq!(page.bubble_text(el).as_deref(), Some("Hello"));

    page.leave(el);
    assert_eq!(page.bubble_text(el), None);

    page.host
        .set_attribute(el, TOOLTIP_TEXT_ATTRIBUTE, "World")
        .unwrap();
    page.enter(el);
    assert_eq!(page.bubble_text(el).as_deref(), Some("World"));
}

#[test]
fn missing_attribute_shows_empty_bubble() {
    let mut page = Page::new();
    let el = page.tooltip(None);
    page.enter(el);
    assert_eq!(page.bubbles(el).len(), 1);
    assert_eq!(page.bubble_text(el).as_deref(), Some(""));
}

#[test]
fn repeated_enter_keeps_single_bubble() {
    let mut page = Page::new();
    let el = page.tooltip(Some("once"));
    page.enter(el);
    page.enter(el);
    page.enter(el);
    assert_eq!(page.bubbles(el).len(), 1);
}

#[test]
fn leave_without_bubble_is_noop() {
    let mut page = Page::new();
    let el = page.tooltip(Some("x"));
    page.leave(el);
    page.leave(el);
    assert!(page.bubbles(el).is_empty());
    let shadow = page.widget(el).shadow_root().unwrap();
    assert_eq!(page.host.document().children(shadow).len(), 3);
}

#[test]
fn bubble_is_appended_after_static_markup() {
    let mut page = Page::new();
    let el = page.tooltip(Some("x"));
    page.enter(el);
    let shadow = page.widget(el).shadow_root().unwrap();
    let doc = page.host.document();
    let tags: Vec<_> = doc
        .children(shadow)
        .iter()
        .filter_map(|&n| doc.tag(n))
        .collect();
    assert_eq!(tags, vec!["style", "slot", "span", "div"]);
}

// ============================================================================
// 2. Attribute edits
// ============================================================================

#[test]
fn attribute_edit_while_visible_keeps_rendered_text() {
    let mut page = Page::new();
    let el = page.tooltip(Some("before"));
    page.enter(el);
    page.host
        .set_attribute(el, TOOLTIP_TEXT_ATTRIBUTE, "after")
        .unwrap();
    assert_eq!(page.widget(el).tooltip_text(), Some("after"));
    assert_eq!(page.bubble_text(el).as_deref(), Some("before"));

    page.enter(el);
    assert_eq!(page.bubble_text(el).as_deref(), Some("before"));

    page.leave(el);
    page.enter(el);
    assert_eq!(page.bubble_text(el).as_deref(), Some("after"));
}

#[test]
fn tooltips_do_not_share_state() {
    let mut page = Page::new();
    let a = page.tooltip(Some("a"));
    let b = page.tooltip(Some("b"));
    page.enter(a);
    assert_eq!(page.bubble_text(a).as_deref(), Some("a"));
    assert_eq!(page.bubble_text(b), None);
    page.enter(b);
    page.leave(a);
    assert_eq!(page.bubble_text(a), None);
    assert_eq!(page.bubble_text(b).as_deref(), Some("b"));
}

// ============================================================================
// 3. Detachment
// ============================================================================

#[test]
fn detach_releases_both_listeners() {
    let mut page = Page::new();
    let el = page.tooltip(Some("x"));
    let icon = page.icon(el);
    assert_eq!(page.host.document().listener_count(), 2);

    page.host.remove_child(page.body, el).unwrap();
    let doc = page.host.document();
    assert!(doc.listeners(icon, PointerEventKind::Enter).is_empty());
    assert!(doc.listeners(icon, PointerEventKind::Leave).is_empty());
    assert_eq!(doc.listener_count(), 0);
    assert_eq!(page.host.dispatch_pointer(icon, PointerEventKind::Enter), 0);
}

#[test]
fn detach_leaves_other_listeners_alone() {
    let mut page = Page::new();
    let a = page.tooltip(Some("a"));
    let b = page.tooltip(Some("b"));
    page.host.remove_child(page.body, a).unwrap();
    assert_eq!(page.host.document().listener_count(), 2);
    page.enter(b);
    assert_eq!(page.bubble_text(b).as_deref(), Some("b"));
}

#[test]
fn double_disconnect_is_harmless() {
    let mut page = Page::new();
    let el = page.tooltip(Some("x"));
    page.host.remove_child(page.body, el).unwrap();
    // Re-insert into a detached container, then detach that: no reaction
    // reaches the tooltip the second time, and nothing panics.
    let holder = page.host.create_element("div");
    page.host.append_child(holder, el).unwrap();
    page.host.remove_child(holder, el).unwrap();
    assert_eq!(page.host.document().listener_count(), 0);

    let disconnects = page
        .host
        .reactions()
        .iter()
        .filter(|r| r.node == el && r.kind == ReactionKind::Disconnected)
        .count();
    assert_eq!(disconnects, 1);
}

#[test]
fn disconnect_without_connect_is_harmless() {
    let mut page = Page::new();
    let holder = page.host.create_element("div");
    let el = page.host.create_element(TOOLTIP_TAG);
    page.host.append_child(holder, el).unwrap();
    page.host.remove_child(holder, el).unwrap();
    assert_eq!(page.widget(el).icon(), None);
    assert_eq!(page.host.document().listener_count(), 0);
}

#[test]
fn ancestor_removal_detaches_tooltip() {
    let mut page = Page::new();
    let section = page.host.create_element("section");
    page.host.append_child(page.body, section).unwrap();
    let el = page.host.create_element(TOOLTIP_TAG);
    page.host.append_child(section, el).unwrap();
    assert_eq!(page.host.document().listener_count(), 2);
    page.host.remove_child(page.body, section).unwrap();
    assert_eq!(page.host.document().listener_count(), 0);
}

#[test]
fn replacing_container_content_detaches_tooltip() {
    let mut page = Page::new();
    let section = page.host.create_element("section");
    page.host.append_child(page.body, section).unwrap();
    let el = page.host.create_element(TOOLTIP_TAG);
    page.host.append_child(section, el).unwrap();
    let icon = page.icon(el);

    page.host.set_text_content(section, "gone").unwrap();
    assert!(!page.host.document().is_connected(el));
    assert_eq!(page.host.document().listener_count(), 0);
    assert_eq!(page.host.dispatch_pointer(icon, PointerEventKind::Enter), 0);
    assert!(page.bubbles(el).is_empty());
}

#[test]
fn long_hover_session_keeps_reaction_log_bounded() {
    let mut page = Page::new();
    let el = page.tooltip(Some("x"));
    for _ in 0..10_000 {
        page.enter(el);
        page.leave(el);
    }
    assert!(page.host.reactions().len() <= DEFAULT_REACTION_CAPACITY);
    assert!(page.bubbles(el).is_empty());
}

#[test]
fn reattach_rebinds_and_rereads_attribute() {
    let mut page = Page::new();
    let el = page.tooltip(Some("first"));
    page.host.remove_child(page.body, el).unwrap();
    page.host
        .set_attribute(el, TOOLTIP_TEXT_ATTRIBUTE, "second")
        .unwrap();
    page.host.append_child(page.body, el).unwrap();
    assert_eq!(page.host.document().listener_count(), 2);
    page.enter(el);
    assert_eq!(page.bubble_text(el).as_deref(), Some("second"));
}

// ============================================================================
// 4. Styling hooks
// ============================================================================

#[test]
fn important_class_emphasizes_host() {
    let mut page = Page::new();
    let plain = page.tooltip(Some("x"));
    let loud = page.tooltip(Some("y"));
    page.host.set_attribute(loud, "class", "important").unwrap();

    let doc = page.host.document();
    let style = computed_style(doc, loud);
    assert_eq!(style.get("border"), Some("1px solid red"));
    assert_eq!(style.get("padding"), Some("0.15rem"));
    assert_eq!(style.get("background"), Some("grey"));
    assert_eq!(computed_style(doc, plain).get("border"), None);
}

#[test]
fn paragraph_ancestor_turns_text_pink() {
    let mut page = Page::new();
    let p = page.host.create_element("p");
    page.host.append_child(page.body, p).unwrap();
    let inside = page.host.create_element(TOOLTIP_TAG);
    page.host.append_child(p, inside).unwrap();
    let outside = page.tooltip(Some("x"));

    let doc = page.host.document();
    assert_eq!(computed_style(doc, inside).get("color"), Some("pink"));
    assert_eq!(computed_style(doc, outside).get("color"), None);
}

#[test]
fn bubble_background_comes_from_page_variable() {
    let mut page = Page::new();
    page.host
        .set_attribute(page.body, "style", "--color-primary: #2a6")
        .unwrap();
    let el = page.tooltip(Some("x"));
    page.enter(el);
    let bubble = page.widget(el).bubble(page.host.document()).unwrap();
    let style = computed_style(page.host.document(), bubble);
    assert_eq!(style.get("background"), Some("#2a6"));
    assert_eq!(style.get("color"), Some("white"));
    assert_eq!(style.get("position"), Some("absolute"));
    assert_eq!(style.get("z-index"), Some("10"));
}

#[test]
fn highlighted_slotted_child_inherits_slot_background() {
    let mut page = Page::new();
    page.host
        .set_attribute(page.body, "style", "background-color: olive")
        .unwrap();
    let el = page.tooltip(Some("x"));
    let label = page.host.create_element("span");
    page.host.set_attribute(label, "class", "highlight").unwrap();
    page.host.append_child(el, label).unwrap();
    let shadow = page.widget(el).shadow_root().unwrap();
    let slot = page
        .host
        .document()
        .query_selector(shadow, "slot")
        .unwrap()
        .unwrap();
    page.host
        .set_attribute(slot, "style", "background-color: navy")
        .unwrap();

    let doc = page.host.document();
    assert_eq!(doc.assigned_nodes(slot), vec![label]);
    assert_eq!(
        computed_style(doc, label).get("background-color"),
        Some("navy")
    );
}

#[test]
fn page_styles_do_not_reach_shadow_markup() {
    let mut page = Page::new();
    let sheet = page.host.create_element("style");
    page.host
        .set_text_content(sheet, "span { color: green } div { z-index: 99 }")
        .unwrap();
    page.host.append_child(page.body, sheet).unwrap();
    let el = page.tooltip(Some("x"));
    page.enter(el);

    let doc = page.host.document();
    let icon = page.icon(el);
    assert_eq!(computed_style(doc, icon).get("color"), Some("white"));
    let bubble = page.widget(el).bubble(doc).unwrap();
    assert_eq!(computed_style(doc, bubble).get("z-index"), Some("10"));
}

// ============================================================================
// 5. Registration
// ============================================================================

#[test]
fn second_definition_is_rejected() {
    let mut page = Page::new();
    assert_eq!(
        tooltip::define(&mut page.host),
        Err(HostError::Registry(RegistryError::DuplicateDefinition(
            TOOLTIP_TAG.to_owned()
        )))
    );
}

#[test]
fn unparseable_style_hooks_are_rejected_at_definition() {
    let mut host = Host::new();
    let result = tooltip::define_with(
        &mut host,
        TooltipConfig::default().emphasis_class("very important"),
    );
    assert!(matches!(
        result,
        Err(HostError::Registry(RegistryError::InvalidDefinition { .. }))
    ));
    let el = host.create_element(TOOLTIP_TAG);
    assert!(!host.is_upgraded(el));
}

#[test]
fn tooltip_created_before_definition_upgrades() {
    let mut host = Host::new();
    let el = host.create_element(TOOLTIP_TAG);
    host.set_attribute(el, TOOLTIP_TEXT_ATTRIBUTE, "late").unwrap();
    let root = host.document().root();
    host.append_child(root, el).unwrap();
    assert!(!host.is_upgraded(el));

    tooltip::define(&mut host).unwrap();
    let icon = host.element::<TooltipWidget>(el).unwrap().icon().unwrap();
    host.dispatch_pointer(icon, PointerEventKind::Enter);
    let widget = host.element::<TooltipWidget>(el).unwrap();
    let bubble = widget.bubble(host.document()).unwrap();
    assert_eq!(host.document().text_content(bubble), "late");
}
