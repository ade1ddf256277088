mod common;

use sm_tui::app::{App, Mode};

use common::{make_site, render_to_string};

fn app_with_sites() -> App {
    let mut app = App::new();
    app.set_sites(vec![
        make_site("blog.example.com", 0),
        make_site("shop.example.com", 1),
        make_site("wiki.example.com", 2),
    ]);
    app
}

#[test]
fn empty_site_list() {
    let app = App::new();
    let output = render_to_string(&app, 80, 40);
    insta::assert_snapshot!(output);
}

#[test]
fn lists_names_with_app_ports() {
    let app = app_with_sites();
    let output = render_to_string(&app, 80, 40);
    insta::assert_snapshot!(output);
}

#[test]
fn details_follow_selection() {
    let mut app = app_with_sites();
    app.selected_index = 1;
    let output = render_to_string(&app, 80, 40);
    insta::assert_snapshot!(output);
}

#[test]
fn unset_ports_are_flagged() {
    let mut app = App::new();
    let mut site = make_site("broken", 0);
    site.app_port = 0;
    app.set_sites(vec![site]);
    let output = render_to_string(&app, 80, 40);
    assert!(!output.contains("http://localhost"));
    insta::assert_snapshot!(output);
}

#[test]
fn filter_narrows_the_list() {
    let mut app = app_with_sites();
    app.filter = "shop".into();
    app.clamp_selection();

    let names: Vec<&str> = app.visible_sites().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["shop.example.com"]);

    let output = render_to_string(&app, 80, 40);
    assert!(!output.contains("blog.example.com"));
    insta::assert_snapshot!(output);
}

#[test]
fn filter_with_no_match() {
    let mut app = app_with_sites();
    app.filter = "zzz".into();
    app.mode = Mode::Filter;
    app.clamp_selection();
    assert!(app.selected_site().is_none());

    let output = render_to_string(&app, 80, 40);
    insta::assert_snapshot!(output);
}

#[test]
fn set_sites_keeps_selection_in_range() {
    let mut app = app_with_sites();
    app.selected_index = 2;
    app.set_sites(vec![make_site("blog.example.com", 0)]);
    assert_eq!(app.selected_index, 0);
    assert_eq!(app.selected_site().map(|s| s.name.as_str()), Some("blog.example.com"));
}

#[test]
fn selection_wraps() {
    let mut app = app_with_sites();
    app.select_prev();
    assert_eq!(app.selected_index, 2);
    app.select_next();
    assert_eq!(app.selected_index, 0);
}

#[test]
fn status_message_shown() {
    let mut app = app_with_sites();
    app.set_status("Deleted site blog.example.com");
    let output = render_to_string(&app, 80, 40);
    insta::assert_snapshot!(output);
}
