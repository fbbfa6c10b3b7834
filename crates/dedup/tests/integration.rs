use listwash_dedup::{
    check_tabs, filter_tab, remove_from_tab, ColumnPreferences, ExclusionIndex, MatchConfig,
    Matcher, Record, RemovalSet, Signal, Tab,
};

fn tab(name: &str, rows: &[&[&str]]) -> Tab {
    Tab::from_rows(
        name,
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
}

const HEADER: &[&str] = &["name", "email", "phone", "website", "primary contact"];

fn defaults() -> (ColumnPreferences, MatchConfig) {
    (ColumnPreferences::default(), MatchConfig::default())
}

fn reference() -> Tab {
    tab(
        "Calgary",
        &[
            HEADER,
            &["Acme Spa", "", "", "www.AcmeSpa.com", "Dana"],
            &["Other Place", "", "(403) 555-0134", "", ""],
            &["Glo Skin Bar", "", "", "", "Lee"],
        ],
    )
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn scenario_domain_match_removes_in_exact_mode() {
    let (prefs, config) = defaults();
    let index = ExclusionIndex::from_tab(&reference(), &prefs, &config);
    let source = tab("Calgary", &[HEADER, &["Acme Day Spa", "", "", "https://acmespa.com/book-now", ""]]);

    let out = filter_tab(&source, &index, &prefs);
    assert_eq!(out.removed, 1);
    assert_eq!(out.removed_by["website"], 1);
    assert_eq!(out.rows.len(), 1);
}

#[test]
fn scenario_phone_formats_match() {
    let (prefs, config) = defaults();
    let index = ExclusionIndex::from_tab(&reference(), &prefs, &config);
    let source = tab("Calgary", &[HEADER, &["Brand New Studio", "", "403-555-0134", "", ""]]);

    let out = filter_tab(&source, &index, &prefs);
    assert_eq!(out.removed_by["phone"], 1);
    assert_eq!(out.kept, 0);
}

#[test]
fn scenario_fuzzy_name_flagged_only_in_cross_sheet_mode() {
    let (prefs, config) = defaults();
    let candidate = tab("Calgary", &[HEADER, &["Glow Skin Bar", "", "", "", "Ana"]]);

    let index = ExclusionIndex::from_tab(&reference(), &prefs, &config);
    let filtered = filter_tab(&candidate, &index, &prefs);
    assert_eq!(filtered.kept, 1);

    let report = check_tabs(&[candidate], &[reference()], &prefs, &config);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].match_type, "Business Name (91%)");
    assert_eq!(report.rows[0].b_business_name, "Glo Skin Bar");
    assert_eq!(report.rows[0].b_primary_contact, "Lee");
}

#[test]
fn scenario_unmatched_candidate_is_kept() {
    let (prefs, config) = defaults();
    let index = ExclusionIndex::from_tab(&reference(), &prefs, &config);
    let candidate = tab("Calgary", &[HEADER, &["Zen Nails", "zen@nails.ca", "780 555 0000", "zennails.ca", ""]]);

    let out = filter_tab(&candidate, &index, &prefs);
    assert_eq!(out.kept, 1);
    assert_eq!(out.rows[1], candidate.rows[0]);

    let report = check_tabs(&[candidate], &[reference()], &prefs, &config);
    assert!(report.rows.is_empty());
    assert_eq!(report.summary.skipped_no_signal, 0);
}

#[test]
fn scenario_empty_row_is_skipped() {
    let (prefs, config) = defaults();
    let candidate = tab("Calgary", &[HEADER, &["", "", "", "", ""], &["", " ", "", "N/A", "Someone"]]);

    let report = check_tabs(&[candidate], &[reference()], &prefs, &config);
    assert!(report.rows.is_empty());
    assert_eq!(report.summary.skipped_no_signal, 2);
}

// -------------------------------------------------------------------------
// Pipelines
// -------------------------------------------------------------------------

#[test]
fn check_then_remove_in_process() {
    let (prefs, config) = defaults();
    let candidate = tab(
        "Calgary",
        &[
            HEADER,
            &["Glow Skin Bar", "", "", "", "Ana"],
            &["Zen Nails", "", "780 555 0000", "", ""],
            &["ACME SPA", "", "", "", ""],
        ],
    );

    let report = check_tabs(&[candidate.clone()], &[reference()], &prefs, &config);
    assert_eq!(report.rows.len(), 2);

    let set = RemovalSet::from_report(&report);
    let out = remove_from_tab(&candidate, &set, &prefs, &config);
    assert_eq!(out.removed, 2);
    assert_eq!(out.rows, candidate.with_rows(vec![candidate.rows[1].clone()]));

    let again = remove_from_tab(&Tab::from_rows("Calgary", out.rows.clone()), &set, &prefs, &config);
    assert_eq!(again.removed, 0);
}

#[test]
fn exclusion_across_all_reference_tabs() {
    let (prefs, config) = defaults();
    let edmonton = tab("Edmonton", &[HEADER, &["Northside Lashes", "", "", "", ""]]);
    let index = ExclusionIndex::build(&[reference(), edmonton], &prefs, &config);

    let source = tab(
        "Red Deer",
        &[HEADER, &["Northside Lashes", "", "", "", ""], &["Fresh Cuts", "", "", "", ""]],
    );
    let out = filter_tab(&source, &index, &prefs);
    assert_eq!(out.removed, 1);
    assert_eq!(out.rows[1][0], "Fresh Cuts");

    let record = Record {
        business_name: Some("northside  lashes".into()),
        ..Record::default()
    };
    let m = Matcher::new(&index).exact(&record);
    assert_eq!(m.signals, vec![Signal::BusinessName { confidence: None }]);
}

#[test]
fn custom_thresholds_from_toml() {
    let config = MatchConfig::from_toml("fuzzy_threshold = 95\nfuzzy_tie_break = \"first\"\n").unwrap();
    let prefs = ColumnPreferences::default();
    let candidate = tab("Calgary", &[HEADER, &["Glow Skin Bar", "", "", "", ""]]);

    let report = check_tabs(&[candidate], &[reference()], &prefs, &config);
    assert!(report.rows.is_empty());
}

#[test]
fn summary_serializes_for_json_output() {
    let (prefs, config) = defaults();
    let candidate = tab("Calgary", &[HEADER, &["Acme Spa", "", "", "", ""]]);
    let report = check_tabs(&[candidate], &[reference()], &prefs, &config);

    let json = serde_json::to_value(&report.summary).unwrap();
    assert_eq!(json["duplicates"], 1);
    assert_eq!(json["signal_counts"]["business_name"], 1);
    assert_eq!(json["tabs"][0]["tab"], "Calgary");
}
