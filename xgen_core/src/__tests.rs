use std::path::Path;

use rstest::rstest;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;

fn span_of(text: &str, name: &str) -> ElementSpan {
	Document::parse(text)
		.elements()
		.find(|element| element.name == name)
		.map(Element::span)
		.unwrap_or_else(|| panic!("no `{name}` element in {text:?}"))
}

fn root_span(text: &str) -> ElementSpan {
	Document::parse(text)
		.root()
		.map(Element::span)
		.unwrap_or_else(|| panic!("no root element in {text:?}"))
}

fn write_file(path: &Path, content: &str) {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
	}
	std::fs::write(path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
}

// Type normalization and mapping resolution

#[rstest]
#[case::keyword("Integer", "int")]
#[case::qualified("System.Int32", "int")]
#[case::case_insensitive("STRING", "string")]
#[case::of_generics("List(Of Dictionary(Of String, Integer))", "list<dictionary<string,int>>")]
#[case::angle_generics("Dictionary<string, System.Boolean>", "dictionary<string,bool>")]
#[case::array_parentheses("String()", "string()")]
#[case::nullable("Nullable(Of DateTime)", "datetime?")]
#[case::nullable_alias("Nullable<Integer>", "int?")]
fn normalizes_type_names(#[case] input: &str, #[case] expected: &str) {
	assert_eq!(normalize_type_name(input), expected);
}

#[rstest]
#[case::exact_read_write("string", "FirstName", false, "STRING_RW")]
#[case::name_filter_wins_in_order("string", "UserPassword", false, "PASSWORD")]
#[case::exact_read_only("String", "FirstName", true, "STRING_RO")]
#[case::alias("System.String", "LastName", false, "STRING_RW")]
#[case::read_only_falls_back_to_read_write("int", "Age", true, "INT_RW")]
#[case::unknown_type_uses_fallback("double", "Price", false, "FALLBACK")]
#[case::exact_generic_beats_earlier_wildcard("ObservableCollection<string>", "Tags", false, "STRING_COLLECTION")]
#[case::of_syntax_generic("ObservableCollection(Of String)", "Tags", false, "STRING_COLLECTION")]
#[case::wildcard_generic("ObservableCollection<Person>", "People", false, "COLLECTION_RW")]
#[case::read_only_wildcard_falls_back("ObservableCollection<Person>", "People", true, "COLLECTION_RW")]
#[case::read_write_never_uses_read_only("List<int>", "Ids", false, "FALLBACK")]
#[case::read_only_wildcard("List<int>", "Ids", true, "LIST_RO")]
#[case::nullable_retries_underlying("int?", "Count", false, "INT_RW")]
#[case::nullable_generic("Nullable<Integer>", "Count", false, "INT_RW")]
#[case::arity_must_match("Dictionary<string, int>", "Lookup", false, "FALLBACK")]
fn resolves_templates(
	#[case] type_name: &str,
	#[case] member_name: &str,
	#[case] is_read_only: bool,
	#[case] expected: &str,
) {
	let profile = resolver_profile();
	assert_eq!(resolve(&profile, type_name, member_name, is_read_only), expected);
}

#[test]
fn enum_members_use_enum_mapping() {
	let profile = resolver_profile();
	let resolver = Resolver::new(&profile);

	assert_eq!(resolver.resolve_member(&status_member()), "ENUM");
	assert_eq!(
		resolver.resolve_member(&MemberDescriptor::new("Status", "OrderStatus", false)),
		"FALLBACK"
	);
}

#[test]
fn type_patterns_support_alternatives() {
	let pattern = TypePattern::parse("int|long|Dictionary<T, T>");

	assert_eq!(pattern.matches("long"), Some(TypeMatchKind::Exact));
	assert_eq!(
		pattern.matches(&normalize_type_name("Dictionary<string, int>")),
		Some(TypeMatchKind::Wildcard)
	);
	assert_eq!(pattern.matches("short"), None);
	assert_eq!(pattern.matches("list<int>"), None);
}

#[test]
fn resolution_is_deterministic() {
	let profile = resolver_profile();
	let first: Vec<&str> = ["string", "int", "List<int>", "Guid"]
		.iter()
		.map(|type_name| resolve(&profile, type_name, "Value", true))
		.collect();
	let second: Vec<&str> = ["string", "int", "List<int>", "Guid"]
		.iter()
		.map(|type_name| resolve(&profile, type_name, "Value", true))
		.collect();

	assert_eq!(first, second);
	assert_eq!(first, vec!["STRING_RO", "INT_RW", "LIST_RO", "FALLBACK"]);
}

// Placeholders and expansion

#[rstest]
#[case::two_words("FirstName", "First Name")]
#[case::single_word("Age", "Age")]
#[case::lowercase("name", "name")]
#[case::capital_run("IOStream", "IOStream")]
#[case::acronym_after_word("MyURLValue", "My URLValue")]
#[case::empty("", "")]
fn splits_camel_case(#[case] input: &str, #[case] expected: &str) {
	assert_eq!(split_camel_case(input), expected);
}

#[test]
fn placeholder_vocabulary_is_closed() {
	assert_eq!(all_tokens().count(), Placeholder::ALL.len());
	assert_eq!(
		Placeholder::from_token("$incint$"),
		Some(Placeholder::IncrementingInteger)
	);
	assert_eq!(Placeholder::from_token("$nmae$"), None);
}

#[test]
fn validates_templates() {
	assert_eq!(
		validate_template("$name$ $nmae$ $"),
		vec![
			TemplateIssue::UnknownPlaceholder {
				token: "$nmae$".to_string(),
				offset: 7,
			},
			TemplateIssue::UnmatchedMarker { offset: 14 },
		]
	);
	assert!(validate_template("<TextBox Text=\"{Binding $name$}\" />").is_empty());
}

#[test]
fn unknown_placeholders_are_left_in_place() {
	let profile = flat_profile("$name$");
	let member = MemberDescriptor::new("Total", "decimal", false);

	assert_eq!(
		expand("$type$ $unknown$ $name$", &member, &profile),
		"decimal $unknown$ Total"
	);
}

#[test]
fn incrementing_integer_counts_every_occurrence() {
	let profile = flat_profile("<TextBox Grid.Row=\"$incint$\" Tag=\"$incint$\" />");
	let members = vec![
		MemberDescriptor::new("A", "string", false),
		MemberDescriptor::new("B", "string", false),
	];

	let output = build_output(&profile, &members);
	assert_eq!(
		output,
		"<TextBox Grid.Row=\"1\" Tag=\"2\" />\n<TextBox Grid.Row=\"3\" Tag=\"4\" />"
	);

	// A new pass starts counting again.
	assert_eq!(build_output(&profile, &members), output);
}

#[test]
fn repeating_integer_advances_once_per_member() {
	let profile = flat_profile("<A Row=\"$repint$\" /><B Row=\"$repint$\" />");
	let members = vec![
		MemberDescriptor::new("X", "string", false),
		MemberDescriptor::new("Y", "string", false),
	];

	assert_eq!(
		build_output(&profile, &members),
		"<A Row=\"1\" /><B Row=\"1\" />\n<A Row=\"2\" /><B Row=\"2\" />"
	);
}

#[test]
fn generated_names_count_per_element() {
	let profile = flat_profile(
		"<TextBox x:Name=\"$xname$\" /><TextBlock Tag=\"$repxname$\" /><Button x:Name=\"$xname$\" />",
	);
	let members = vec![
		MemberDescriptor::new("X", "string", false),
		MemberDescriptor::new("Y", "string", false),
	];

	assert_eq!(
		build_output(&profile, &members),
		"<TextBox x:Name=\"TextBox1\" /><TextBlock Tag=\"TextBox1\" /><Button \
		 x:Name=\"Button1\" />\n<TextBox x:Name=\"TextBox2\" /><TextBlock Tag=\"TextBox2\" \
		 /><Button x:Name=\"Button2\" />"
	);
}

#[test]
fn no_output_skips_the_member() {
	let profile = flat_profile("<TextBlock Text=\"{Binding $name$}\" />")
		.with_mapping(Mapping::new("object", false, "$nooutput$"));
	let members = vec![
		MemberDescriptor::new("Tag", "object", false),
		MemberDescriptor::new("Title", "string", false),
	];

	assert_eq!(
		build_output(&profile, &members),
		"<TextBlock Text=\"{Binding Title}\" />"
	);
}

#[test]
fn sub_properties_are_indented_to_the_placeholder() {
	let profile = default_profile("UWP");
	let output = build_output(&profile, &[people_member()]);

	insta::assert_snapshot!(output, @r#"
	<StackPanel>
	  <ListView Header="People" ItemsSource="{x:Bind ViewModel.People}">
	    <ListView.ItemTemplate>
	      <DataTemplate>
	        <StackPanel>
	          <TextBlock Text="{Binding Name}" />
	          <TextBlock Text="{Binding Email}" />
	        </StackPanel>
	      </DataTemplate>
	    </ListView.ItemTemplate>
	  </ListView>
	</StackPanel>
	"#);
}

#[test]
fn enum_members_are_expanded() {
	let options = GenerationOptions::default();

	assert_eq!(
		build_selection_output(&default_profile("UWP"), &[status_member()], &options),
		"<ComboBox Header=\"Status\" SelectedItem=\"{x:Bind ViewModel.Status, \
		 Mode=TwoWay}\">\n  <x:String>Pending</x:String>\n  \
		 <x:String>InProgress</x:String>\n</ComboBox>"
	);
	assert_eq!(
		build_selection_output(&default_profile("WPF"), &[status_member()], &options),
		"<ComboBox SelectedItem=\"{Binding Status}\">\n  <ComboBoxItem Content=\"Pending\" \
		 />\n  <ComboBoxItem Content=\"In Progress\" />\n</ComboBox>"
	);
}

// Output assembly

#[test]
fn builds_grouped_output_for_accessible_members() {
	let output = build_output(&default_profile("UWP Grid"), &person_members());

	insta::assert_snapshot!(output, @r#"
	<Grid>
	  <TextBlock Text="First Name" Grid.Row="1" />
	  <TextBox x:Name="TextBox1" Text="{x:Bind ViewModel.FirstName, Mode=TwoWay}" Grid.Row="1" Grid.Column="1" />
	  <TextBlock Text="Age" Grid.Row="2" />
	  <TextBlock Text="{x:Bind ViewModel.Age}" Grid.Row="2" Grid.Column="1" />
	  <TextBlock Text="Id" Grid.Row="3" />
	  <TextBlock Text="{x:Bind ViewModel.Id}" Grid.Row="3" Grid.Column="1" />
	</Grid>
	"#);
}

#[rstest]
#[case::no_members(vec![])]
#[case::only_private(vec![
	MemberDescriptor::new("Secret", "string", false).with_accessibility(Accessibility::Private),
])]
fn empty_class_keeps_grouping(#[case] members: Vec<MemberDescriptor>) {
	assert_eq!(
		build_output(&default_profile("UWP"), &members),
		"<StackPanel>\n  <!-- No accessible properties -->\n</StackPanel>"
	);
	assert_eq!(
		build_output(&flat_profile("$name$"), &members),
		NO_ACCESSIBLE_MEMBERS
	);
}

#[test]
fn grouping_with_attributes_closes_with_element_name() {
	let profile = flat_profile("<TextBlock Text=\"{Binding $name$}\" />")
		.with_class_grouping("StackPanel Orientation=\"Horizontal\"");
	let members = vec![MemberDescriptor::new("Title", "string", false)];

	assert_eq!(
		build_output_with_options(&profile, &members, &GenerationOptions::with_indent_width(4)),
		"<StackPanel Orientation=\"Horizontal\">\n    <TextBlock Text=\"{Binding Title}\" \
		 />\n</StackPanel>"
	);
}

#[test]
fn left_padding_applies_to_continuation_lines() {
	let options = GenerationOptions::default().with_left_padding("\t\t");
	let output = build_output_with_options(&default_profile("UWP"), &person_members(), &options);
	let lines: Vec<&str> = output.lines().collect();

	assert_eq!(lines[0], "<StackPanel>");
	assert!(lines[1].starts_with("\t\t  <TextBox Header=\"First Name\""));
	assert_eq!(lines.last().copied(), Some("\t\t</StackPanel>"));
}

#[test]
fn selection_output_is_flat() {
	let members = person_members();
	let output = build_selection_output(
		&default_profile("UWP"),
		&members[..2],
		&GenerationOptions::default(),
	);

	assert_eq!(
		output,
		"<TextBox Header=\"First Name\" Text=\"{x:Bind ViewModel.FirstName, Mode=TwoWay}\" \
		 />\n<TextBox Header=\"Age\" InputScope=\"Number\" Text=\"{x:Bind ViewModel.Age, \
		 Mode=TwoWay}\" />"
	);
}

#[rstest]
#[case::none(&[], "")]
#[case::one(&["one"], "one")]
#[case::two(&["one", "two"], "one and two")]
#[case::three(&["one", "two", "three"], "one, two and 1 other member")]
#[case::four(&["one", "two", "three", "four"], "one, two and 2 other members")]
fn summarizes_selections(#[case] names: &[&str], #[case] expected: &str) {
	assert_eq!(summarize_selection(names), expected);
}

// Generator and profile selection

#[test]
fn generator_rejects_empty_profile_set() {
	assert!(matches!(
		Generator::new(ProfileSet::default()),
		Err(XgenError::EmptyProfileSet)
	));
}

#[test]
#[traced_test]
fn missing_class_is_not_an_error() -> XgenResult<()> {
	let generator = Generator::new(default_profiles())?;
	let result = generator.generate_for_class(ProfileSelection::default(), None)?;

	assert_eq!(result, None);
	assert!(logs_contain("no class or module found"));

	Ok(())
}

#[test]
fn generates_for_class_and_selection() -> XgenResult<()> {
	let generator = Generator::new(default_profiles())?;
	let class = ClassDescriptor::new("Person", person_members());

	let whole = generator
		.generate_for_class(ProfileSelection::for_project_type("WPF"), Some(&class))?
		.unwrap_or_else(|| panic!("expected output"));
	assert_eq!(whole.profile, "WPF");
	assert_eq!(whole.summary, "Person");
	assert!(whole.output.starts_with("<StackPanel>\n  <Label Content=\"First Name\" />"));

	let selected = generator
		.generate_for_selection(ProfileSelection::named("uwp"), &class.members)?
		.unwrap_or_else(|| panic!("expected output"));
	assert_eq!(selected.profile, "UWP");
	assert_eq!(selected.summary, "FirstName, Age and 1 other member");
	assert!(!selected.output.contains("StackPanel"));

	let private_only = &class.members[3..];
	assert_eq!(
		generator.generate_for_selection(ProfileSelection::default(), private_only)?,
		None
	);

	Ok(())
}

#[test]
fn profile_selection_errors() {
	let profiles = ProfileSet::new(vec![
		Profile::new("Phone", "$name$").with_project_type("uwp"),
		Profile::new("Desktop", "$name$").with_project_type("wpf"),
	]);

	assert_eq!(
		profiles.select(None, Some("WPF")).map(|p| p.name.as_str()).ok(),
		Some("Desktop")
	);
	assert_eq!(
		profiles.select(None, None).map(|p| p.name.as_str()).ok(),
		Some("Phone")
	);
	assert!(matches!(
		profiles.select(Some("Tablet"), None),
		Err(XgenError::MissingProfile(name)) if name == "Tablet"
	));
	assert!(matches!(
		profiles.select(None, Some("maui")),
		Err(XgenError::MissingProjectProfile(project_type)) if project_type == "maui"
	));
}

#[test]
fn unknown_project_type_uses_first_unscoped_profile() {
	let profiles = default_profiles();
	assert_eq!(
		profiles.for_project_type("avalonia").map(|p| p.name.as_str()),
		Some("UWP Grid")
	);
}

// Profiles and configuration

#[test]
fn default_profiles_are_valid() {
	let profiles = default_profiles();
	let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();

	assert_eq!(names, vec!["UWP", "UWP Grid", "WPF", "Xamarin.Forms"]);
	assert!(profiles.validate().is_empty());
}

#[test]
fn profile_validation_reports_problems() {
	let profile = Profile::new("Broken", "  ")
		.with_mapping(Mapping::new("string", false, "<TextBox Text=\"$nmae$\" />"))
		.with_mapping(Mapping::new("System.String", false, "<TextBox />"))
		.with_mapping(Mapping::new("", false, "<TextBlock />"));

	let issues: Vec<String> = profile.validate().iter().map(ToString::to_string).collect();
	assert_eq!(
		issues,
		vec![
			"Broken (fallback_output): fallback output is empty",
			"Broken (mappings[0]): unknown placeholder `$nmae$` at offset 15",
			"Broken (mappings[1]): mapping is unreachable, shadowed by mappings[0]",
			"Broken (mappings[2]): mapping type is empty",
		]
	);
}

#[test]
fn parses_config_with_inline_profiles() -> XgenResult<()> {
	let config = XgenConfig::parse(
		r#"
active_profile = "Team"
indent = 4

[analysis]
exclude = ["generated/"]

[[profiles]]
name = "Team"
class_grouping = "StackPanel"
fallback_output = "<TextBlock Text=\"{Binding $name$}\" />"

[[profiles.mappings]]
type = "string"
name_contains = "Password | PWD"
output = "<PasswordBox />"
"#,
	)?;

	assert_eq!(config.indent, 4);
	assert_eq!(config.analysis.include, vec![DEFAULT_MARKUP_GLOB]);
	assert_eq!(config.analysis.exclude, vec!["generated/"]);
	assert_eq!(config.analysis.max_file_size, DEFAULT_MAX_FILE_SIZE);

	let filter = &config.profiles[0].mappings[0].name_contains;
	assert_eq!(filter.to_vec(), vec!["Password", "PWD"]);
	assert!(filter.matches("userPwd"));
	assert!(!filter.matches("UserName"));

	assert_eq!(config.generation_options().indent, "    ");

	Ok(())
}

#[test]
fn invalid_config_is_an_error() {
	assert!(matches!(
		XgenConfig::parse("indent = ["),
		Err(XgenError::ConfigParse(_))
	));
}

#[test]
fn discovers_config_candidates_in_order() -> XgenResult<()> {
	let tmp = tempfile::tempdir()?;
	assert!(XgenConfig::load(tmp.path())?.is_none());

	write_file(&tmp.path().join(".config/xgen.toml"), "indent = 3\n");
	assert_eq!(XgenConfig::load_or_default(tmp.path())?.indent, 3);

	write_file(&tmp.path().join("xgen.toml"), "indent = 8\n");
	assert_eq!(XgenConfig::load_or_default(tmp.path())?.indent, 8);
	assert_eq!(
		XgenConfig::resolve_path(tmp.path()),
		Some(tmp.path().join("xgen.toml"))
	);

	Ok(())
}

#[test]
fn builds_profile_set_from_all_sources() -> XgenResult<()> {
	let tmp = tempfile::tempdir()?;
	write_file(
		&tmp.path().join("profiles/team.yaml"),
		r#"profiles:
  - name: Team
    project_type: maui
    fallback_output: "<Label Text=\"{Binding $name$}\" />"
    mappings:
      - type: string
        name_contains: [email]
        output: "<Entry Keyboard=\"Email\" />"
"#,
	);
	write_file(
		&tmp.path().join("profiles/single.json"),
		r#"{ "name": "Single", "fallback_output": "$name$" }"#,
	);

	let config = XgenConfig::parse(
		r#"
profile_paths = ["profiles/team.yaml", "profiles/single.json"]

[[profiles]]
name = "wpf"
fallback_output = "<TextBlock />"
"#,
	)?;
	let profiles = config.profile_set(tmp.path())?;
	let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();

	assert_eq!(
		names,
		vec!["UWP", "UWP Grid", "wpf", "Xamarin.Forms", "Team", "Single"]
	);
	assert_eq!(
		profiles.get("WPF").map(|p| p.fallback_output.as_str()),
		Some("<TextBlock />")
	);
	assert_eq!(
		profiles.for_project_type("MAUI").map(|p| p.name.as_str()),
		Some("Team")
	);

	Ok(())
}

#[test]
fn profile_set_errors() -> XgenResult<()> {
	let tmp = tempfile::tempdir()?;
	write_file(&tmp.path().join("profiles.ini"), "[profile]\n");

	let replaced = XgenConfig::parse("replace_default_profiles = true\n")?;
	assert!(matches!(
		replaced.profile_set(tmp.path()),
		Err(XgenError::EmptyProfileSet)
	));

	let unsupported = XgenConfig::parse("profile_paths = [\"profiles.ini\"]\n")?;
	assert!(matches!(
		unsupported.profile_set(tmp.path()),
		Err(XgenError::UnsupportedProfileFormat(format)) if format == "ini"
	));

	let missing = XgenConfig::parse("profile_paths = [\"missing.toml\"]\n")?;
	assert!(matches!(
		missing.profile_set(tmp.path()),
		Err(XgenError::ProfileFile { .. })
	));

	Ok(())
}

#[rstest]
#[case::config_defaults(None, None, Some("WPF"), Some("uwp"))]
#[case::named_profile_wins(Some("UWP Grid"), None, Some("UWP Grid"), Some("uwp"))]
#[case::project_type_overrides_active_profile(None, Some("xamarin.forms"), None, Some("xamarin.forms"))]
fn selection_prefers_command_line_values(
	#[case] profile: Option<&str>,
	#[case] project_type: Option<&str>,
	#[case] expected_name: Option<&str>,
	#[case] expected_project_type: Option<&str>,
) -> XgenResult<()> {
	let config = XgenConfig::parse("active_profile = \"WPF\"\nproject_type = \"uwp\"\n")?;
	let selection = config.selection(profile, project_type);

	assert_eq!(selection.name, expected_name);
	assert_eq!(selection.project_type, expected_project_type);

	Ok(())
}

#[test]
fn reads_class_facts() -> XgenResult<()> {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("person.json");
	write_file(
		&path,
		r#"{
  "name": "Person",
  "members": [
    { "name": "IsAdmin", "type": "Boolean", "readOnly": true, "accessibility": "private" },
    { "name": "Status", "type": "Status", "enumMembers": ["On", "Off"] }
  ]
}"#,
	);

	let class = ClassDescriptor::load(&path)?;
	assert_eq!(class.name, "Person");
	assert!(class.members[0].is_read_only);
	assert!(!class.members[0].is_accessible());
	assert!(class.members[1].is_enum());
	assert_eq!(class.accessible_members().count(), 1);

	assert!(matches!(
		ClassDescriptor::load(&tmp.path().join("missing.json")),
		Err(XgenError::ClassFacts { .. })
	));

	Ok(())
}

// Markup scanning

#[test]
fn parse_reports_top_level_spans() {
	let text = "<Grid><Grid /></Grid><Grid></Grid>";

	assert_eq!(
		parse(text, "Grid"),
		vec![
			ElementSpan {
				name: "Grid".to_string(),
				start: 0,
				length: 21,
				is_self_closing: false,
			},
			ElementSpan {
				name: "Grid".to_string(),
				start: 21,
				length: 13,
				is_self_closing: false,
			},
		]
	);

	let nested = scan_elements(text, &ElementFilter::named("Grid"), ScanMode::Descend);
	let starts: Vec<usize> = nested.elements.iter().map(|span| span.start).collect();
	assert_eq!(starts, vec![0, 6, 21]);
	assert!(nested.elements[1].is_self_closing);
}

#[rstest]
#[case::self_closing("<Image Source=\"a.png\" />", true)]
#[case::no_space("<Image/>", true)]
#[case::slash_in_value("<Image Source=\"a/b.png\">x</Image>", false)]
#[case::slash_before_quote("<Path Data=\"M0,0 Z/\" >", false)]
#[case::gt_in_value("<TextBlock Text=\"a > b\" />", true)]
fn detects_self_closing_tags(#[case] text: &str, #[case] expected: bool) {
	assert_eq!(is_self_closing(text, 0), expected);
}

#[rstest]
#[case::plain("<Grid>", Some("Grid"))]
#[case::prefixed("<controls:WebView2 />", Some("controls:WebView2"))]
#[case::line_break("<Grid\n  Row=\"1\">", Some("Grid"))]
#[case::property("<Grid.RowDefinitions>", Some("Grid.RowDefinitions"))]
#[case::closing("</Grid>", None)]
#[case::comment("<!-- Grid -->", None)]
#[case::declaration("<?xml version=\"1.0\"?>", None)]
fn reads_element_names(#[case] text: &str, #[case] expected: Option<&str>) {
	assert_eq!(element_name_at(text, 0), expected);
}

#[test]
fn exclusion_zones_cover_nested_content() {
	let text = "<A/><Grid><Grid/><Grid></Grid></Grid><Grid/>x";
	assert_eq!(exclusion_zones(text, "Grid"), vec![10..37]);

	// An unclosed element excludes the rest of the text.
	assert_eq!(exclusion_zones("<Grid><Text/>", "Grid"), vec![6..13]);
}

#[test]
fn comments_are_skipped() {
	let text = "<!-- <Grid></Grid> --><Grid/>";
	let spans = parse(text, "Grid");

	assert_eq!(spans.len(), 1);
	assert_eq!(spans[0].start, 22);
	assert_eq!(comment_ranges(text), vec![0..22]);
	assert_eq!(find_closing_tag("<Grid><!-- </Grid> --></Grid>", 0), Some(22..29));
}

#[test]
fn unclosed_elements_are_reported() {
	let scan = scan_elements("<Grid><TextBox />", &ElementFilter::named("Grid"), ScanMode::TopLevel);

	assert_eq!(scan.elements[0].length, 6);
	assert_eq!(
		scan.issues,
		vec![ScanIssue {
			offset: 0,
			kind: ScanIssueKind::UnclosedElement {
				name: "Grid".to_string(),
			},
		}]
	);
	assert_eq!(element_end("<Grid><TextBox />", 0), None);
}

#[test]
fn unterminated_comment_is_reported() {
	let text = "<Grid></Grid><!-- <Grid>";
	let scan = scan_elements(text, &ElementFilter::named("Grid"), ScanMode::TopLevel);

	assert_eq!(scan.elements.len(), 1);
	assert_eq!(
		scan.issues,
		vec![ScanIssue {
			offset: 13,
			kind: ScanIssueKind::UnterminatedComment,
		}]
	);
	assert_eq!(comment_ranges(text), vec![13..24]);
}

#[test]
fn parses_element_tree() {
	let text = r#"<?xml version="1.0"?>
<!-- header -->
<Page x:Class="App.MainPage" xmlns="a">
  <Grid.Resources />
  <StackPanel Orientation='Horizontal'>
    <TextBlock Text="a > b" />
  </StackPanel>
</Page>
"#;
	let document = Document::parse(text);
	let Some(root) = document.root() else {
		panic!("expected a root element");
	};

	assert!(document.issues.is_empty());
	assert_eq!(document.roots.len(), 1);
	assert_eq!(document.elements().count(), 4);
	assert_eq!(root.name, "Page");
	assert_eq!(
		root.attribute("x:Class").map(|a| a.value.as_str()),
		Some("App.MainPage")
	);

	let children: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
	assert_eq!(children, vec!["Grid.Resources", "StackPanel"]);
	assert!(root.children[0].is_property_element());
	assert!(!root.children[0].is_property_of("Page"));

	let panel = &root.children[1];
	assert_eq!(panel.attributes[0].value, "Horizontal");
	assert_eq!(&text[panel.attributes[0].value_span.clone()], "Horizontal");

	let text_block = &panel.children[0];
	assert!(text_block.is_self_closing);
	assert_eq!(text_block.attributes[0].value, "a > b");
	assert_eq!(document.element_at(text_block.start), Some(text_block));
}

#[rstest]
#[case::inline("<TextBox Text=\"Hi\" />", "Text", AttributeKinds::ALL, Some((AttributeKind::Inline, 9..18, "Hi")))]
#[case::property_element(
	"<TextBox><TextBox.Text>Hello</TextBox.Text></TextBox>",
	"Text",
	AttributeKinds::ALL,
	Some((AttributeKind::Element, 9..43, "Hello"))
)]
#[case::default_value(
	"<TextBlock>  Hello  </TextBlock>",
	"Text",
	AttributeKinds::ALL,
	Some((AttributeKind::DefaultValue, 13..18, "Hello"))
)]
#[case::default_value_excluded("<TextBlock>Hello</TextBlock>", "Text", AttributeKinds::EXPLICIT, None)]
#[case::element_content_is_not_a_value("<TextBlock><Run /></TextBlock>", "Text", AttributeKinds::ALL, None)]
#[case::nested_same_name_ignored(
	"<Grid><Grid><Grid.Row>1</Grid.Row></Grid></Grid>",
	"Row",
	AttributeKinds::ALL,
	None
)]
#[case::inline_only(
	"<TextBox><TextBox.Text>Hello</TextBox.Text></TextBox>",
	"Text",
	AttributeKinds::INLINE,
	None
)]
fn finds_attribute_values(
	#[case] text: &str,
	#[case] name: &str,
	#[case] kinds: AttributeKinds,
	#[case] expected: Option<(AttributeKind, std::ops::Range<usize>, &str)>,
) {
	let found = try_get_attribute(text, name, kinds)
		.map(|found| (found.kind, found.span, found.value));
	let expected = expected.map(|(kind, span, value)| (kind, span, value.to_string()));

	assert_eq!(found, expected);
}

#[test]
fn nested_same_name_scope_sees_only_its_own_attributes() {
	let text = r#"<Grid Tag="o"><Grid Tag="i"><Grid.Row>1</Grid.Row></Grid></Grid>"#;
	let start = text.find(r#"<Grid Tag="i">"#).unwrap_or_default();
	let end = text.find("</Grid>").unwrap_or_default() + "</Grid>".len();
	let inner = &text[start..end];

	let tag = try_get_attribute(inner, "Tag", AttributeKinds::ALL).map(|found| (found.kind, found.value));
	assert_eq!(tag, Some((AttributeKind::Inline, "i".to_string())));

	let row = try_get_attribute(inner, "Row", AttributeKinds::ALL)
		.map(|found| (found.kind, found.span, found.value));
	assert_eq!(row, Some((AttributeKind::Element, 14..36, "1".to_string())));

	let outer_tag = try_get_attribute(text, "Tag", AttributeKinds::ALL).map(|found| found.value);
	assert_eq!(outer_tag.as_deref(), Some("o"));
	assert_eq!(try_get_attribute(text, "Row", AttributeKinds::ALL), None);
}

#[test]
fn strips_children_but_keeps_property_elements() {
	let text = "<Grid Margin=\"4\">\n    <Grid.RowDefinitions>\n        <RowDefinition />\n    \
	            </Grid.RowDefinitions>\n    <TextBlock Text=\"a\" />\n    <Button />\n</Grid>";

	assert_eq!(
		get_opening_without_children(text),
		"<Grid Margin=\"4\">\n    <Grid.RowDefinitions>\n        <RowDefinition />\n    \
		 </Grid.RowDefinitions>\n</Grid>"
	);
	assert_eq!(
		get_opening_without_children("<Button Content=\"Ok\" />"),
		"<Button Content=\"Ok\" />"
	);
	assert_eq!(get_opening_without_children("just text"), "");
}

#[test]
fn maps_offsets_to_lines_and_columns() {
	let text = "<Page>\n  <Grid>\n</Page>";
	let lines = LineTable::new(text);

	assert_eq!(lines.position(text, 0), (1, 1));
	assert_eq!(lines.position(text, 9), (2, 3));
	assert_eq!(lines.position(text, text.len()), (3, 8));
	assert_eq!(line_indent_at(text, 9), "  ");
}

// Edit scripts and fixes

#[test]
fn edit_script_rejects_overlaps_and_out_of_bounds() {
	let overlapping = EditScript::new(vec![
		TextEdit::replace(0..4, "a", ""),
		TextEdit::replace(2..6, "b", ""),
	]);
	assert!(matches!(
		overlapping.validate(10),
		Err(XgenError::OverlappingEdits {
			start: 2,
			end: 6,
			previous_end: 4,
		})
	));

	let out_of_bounds = EditScript::new(vec![TextEdit::insert(100, "x", "")]);
	assert!(matches!(
		out_of_bounds.apply("abc"),
		Err(XgenError::EditOutOfBounds {
			start: 100,
			end: 100,
			len: 3,
		})
	));
}

#[test]
fn insertions_at_one_offset_keep_their_order() -> XgenResult<()> {
	let script = EditScript::new(vec![
		TextEdit::insert(1, "x", "first"),
		TextEdit::insert(1, "y", "second"),
		TextEdit::delete(2..3, "first"),
	]);

	assert_eq!(script.apply("abc")?, "axyb");
	assert_eq!(script.descriptions(), vec!["first", "second"]);

	Ok(())
}

#[test]
fn remove_child_removes_exactly_the_child() {
	let fix = FixSuggestion::new(
		"Remove empty Grid.RowDefinitions",
		span_of(GRID_PAGE, "Grid"),
		FixAction::RemoveChild {
			child: span_of(GRID_PAGE, "Grid.RowDefinitions"),
		},
	);
	let outcome = apply_fix(GRID_PAGE, &fix);

	assert!(outcome.success);
	assert_eq!(
		outcome.text,
		"<Grid>\n  \n  <TextBlock Text=\"{Binding Title}\" />\n</Grid>\n"
	);
	assert_eq!(outcome.changes, vec!["Removed `Grid.RowDefinitions`"]);
}

#[test]
fn rename_updates_opening_and_closing_tags() {
	let text = "<Page>\n  <WebView>\n  </WebView>\n</Page>";
	let fix = FixSuggestion::new(
		"Use WebView2",
		span_of(text, "WebView"),
		FixAction::RenameElement {
			new_name: "WebView2".to_string(),
		},
	);

	assert_eq!(
		apply_fix(text, &fix).text,
		"<Page>\n  <WebView2>\n  </WebView2>\n</Page>"
	);
}

#[rstest]
#[case::adds_new("<TextBox Text=\"a\" />", "<TextBox Text=\"a\" InputScope=\"Default\" />")]
#[case::adds_after_name("<TextBox/>", "<TextBox InputScope=\"Default\"/>")]
#[case::updates_existing("<TextBox InputScope=\"Text\" />", "<TextBox InputScope=\"Default\" />")]
#[case::keeps_matching("<TextBox InputScope=\"Default\" />", "<TextBox InputScope=\"Default\" />")]
fn add_attribute(#[case] text: &str, #[case] expected: &str) {
	let fix = FixSuggestion::new(
		"Add InputScope",
		root_span(text),
		FixAction::AddAttribute {
			name: "InputScope".to_string(),
			value: "Default".to_string(),
		},
	);

	assert_eq!(apply_fix(text, &fix).text, expected);
}

#[test]
fn remove_attribute_takes_leading_whitespace() {
	let text = "<Button IsEnabled=\"True\" Content=\"{Binding Save}\" />";
	let fix = FixSuggestion::new(
		"Remove IsEnabled",
		root_span(text),
		FixAction::RemoveAttribute {
			name: "IsEnabled".to_string(),
		},
	);

	assert_eq!(
		apply_fix(text, &fix).text,
		"<Button Content=\"{Binding Save}\" />"
	);
}

#[rstest]
#[case::no_namespaces("<Page Title=\"t\">\n</Page>", "<Page xmlns:controls=\"c\" Title=\"t\">\n</Page>")]
#[case::after_last_namespace(
	"<Page xmlns=\"a\" xmlns:x=\"b\" Title=\"t\">\n</Page>",
	"<Page xmlns=\"a\" xmlns:x=\"b\" xmlns:controls=\"c\" Title=\"t\">\n</Page>"
)]
#[case::one_per_line(
	"<Page\n    xmlns=\"a\"\n    xmlns:x=\"b\">\n</Page>",
	"<Page\n    xmlns=\"a\"\n    xmlns:x=\"b\"\n    xmlns:controls=\"c\">\n</Page>"
)]
#[case::already_declared("<Page xmlns:controls=\"c\">\n</Page>", "<Page xmlns:controls=\"c\">\n</Page>")]
fn add_xmlns_alias_is_idempotent(#[case] text: &str, #[case] expected: &str) {
	let fix = FixSuggestion::new(
		"Add controls namespace",
		root_span(text),
		FixAction::AddXmlnsAlias {
			alias: "controls".to_string(),
			namespace: "c".to_string(),
		},
	);

	let once = apply_fix(text, &fix);
	assert!(once.success);
	assert_eq!(once.text, expected);

	let twice = apply_fix(&once.text, &fix);
	assert_eq!(twice.text, expected);
	assert!(twice.changes.is_empty());
}

#[test]
fn missing_target_leaves_text_unchanged() {
	let text = "<Page />";
	let fix = FixSuggestion::new(
		"Rename",
		ElementSpan {
			name: "Grid".to_string(),
			start: 3,
			length: 5,
			is_self_closing: true,
		},
		FixAction::RenameElement {
			new_name: "StackPanel".to_string(),
		},
	);

	assert!(matches!(
		plan_fix(text, &fix),
		Err(XgenError::FixTargetNotFound { name, offset: 3 }) if name == "Grid"
	));
	assert_eq!(
		apply_fix(text, &fix),
		FixOutcome {
			text: text.to_string(),
			success: false,
			changes: vec![],
		}
	);
}

#[test]
fn overlapping_fixes_are_skipped() {
	let text = "<StackPanel>\n  <Label Content=\"Hi\" />\n</StackPanel>";
	let label = span_of(text, "Label");
	let fixes = vec![
		FixSuggestion::new(
			"Replace",
			label.clone(),
			FixAction::ReplaceElement {
				replacement: "<TextBlock Text=\"Hi\" />".to_string(),
			},
		),
		FixSuggestion::new(
			"Add margin",
			label,
			FixAction::AddAttribute {
				name: "Margin".to_string(),
				value: "4".to_string(),
			},
		),
	];

	let outcome = apply_fixes(text, &fixes);
	assert!(outcome.success);
	assert_eq!(
		outcome.text,
		"<StackPanel>\n  <TextBlock Text=\"Hi\" />\n</StackPanel>"
	);
	assert_eq!(outcome.changes, vec!["Replaced `Label`"]);
}

#[test]
fn fix_actions_serialize_with_tag() -> Result<(), serde_json::Error> {
	let fix = FixSuggestion::new(
		"Use WebView2",
		ElementSpan {
			name: "WebView".to_string(),
			start: 2,
			length: 12,
			is_self_closing: true,
		},
		FixAction::RenameElement {
			new_name: "controls:WebView2".to_string(),
		},
	);
	let value = serde_json::to_value(&fix)?;

	assert_eq!(value["target"]["start"], 2);
	assert_eq!(value["action"]["new_name"], "controls:WebView2");

	Ok(())
}

// Analysis

#[test]
fn analyzes_markup_documents() {
	let registry = AnalyzerRegistry::with_defaults();
	let diagnostics = registry.analyze(&AnalysisContext::new(MAIN_PAGE), None);
	let summary: Vec<(&str, Severity, usize, usize)> = diagnostics
		.iter()
		.map(|d| (d.code.as_str(), d.severity, d.line, d.column))
		.collect();

	assert_eq!(
		summary,
		vec![
			("XG101", Severity::Suggestion, 3, 6),
			("XG103", Severity::Warning, 4, 6),
		]
	);
	assert!(diagnostics.iter().all(MarkupDiagnostic::is_shown_by_default));
	assert!(diagnostics.iter().all(|d| d.fix.is_some()));
}

#[test]
fn built_in_analyzer_codes_are_unique() {
	let registry = AnalyzerRegistry::with_defaults();
	let codes: Vec<&str> = registry.analyzers().map(|analyzer| analyzer.code()).collect();

	assert_eq!(
		codes,
		vec!["XG101", "XG102", "XG103", "XG104", "XG105", "XG106", "XG107"]
	);
}

#[test]
fn hard_coded_strings_point_at_the_attribute() {
	let text = "<TextBlock Text=\"Hello\" />";
	let diagnostics =
		AnalyzerRegistry::with_defaults().analyze(&AnalysisContext::new(text), None);

	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0].code, "XG102");
	assert_eq!(diagnostics[0].range, 11..23);
	assert_eq!(diagnostics[0].column, 12);
	assert_eq!(
		diagnostics[0].message,
		"`Text` on `TextBlock` is the hard-coded string \"Hello\"; use a resource or binding"
	);
	assert_eq!(diagnostics[0].fix, None);
}

#[rstest]
#[case::empty_definitions(GRID_PAGE, None, "<Grid>\n  \n  <TextBlock Text=\"{Binding Title}\" />\n</Grid>\n")]
#[case::image_name(
	"<Image Source=\"Assets/logo.png\" />",
	None,
	"<Image Source=\"Assets/logo.png\" AutomationProperties.Name=\"logo\" />"
)]
#[case::redundant_is_enabled(
	"<Button IsEnabled=\"True\" Content=\"{Binding Save}\" />",
	None,
	"<Button Content=\"{Binding Save}\" />"
)]
#[case::label_outside_uwp("<Label Content=\"{Binding Title}\" />", None, "<Label Content=\"{Binding Title}\" />")]
#[case::label_in_uwp(
	"<Label Content=\"{Binding Title}\" />",
	Some("UWP"),
	"<TextBlock Text=\"{Binding Title}\" />"
)]
#[case::label_with_closing_tag(
	"<Label Content=\"{Binding Title}\"></Label>",
	Some("uwp"),
	"<TextBlock Text=\"{Binding Title}\"></TextBlock>"
)]
fn fixes_documents(#[case] text: &str, #[case] project_type: Option<&str>, #[case] expected: &str) {
	let mut context = AnalysisContext::new(text);
	if let Some(project_type) = project_type {
		context = context.with_project_type(project_type);
	}

	let outcome = AnalyzerRegistry::with_defaults().fix_document(&context, None);
	assert!(outcome.success);
	assert_eq!(outcome.text, expected);
}

#[test]
fn shared_namespace_edits_apply_once() {
	let text = "<Page xmlns=\"a\">\n  <WebView />\n  <WebView />\n</Page>";
	let outcome =
		AnalyzerRegistry::with_defaults().fix_document(&AnalysisContext::new(text), None);

	assert_eq!(
		outcome.text,
		format!(
			"<Page xmlns=\"a\" xmlns:controls=\"{WEBVIEW2_NAMESPACE}\">\n  <controls:WebView2 />\n  \
			 <controls:WebView2 />\n</Page>"
		)
	);
	assert_eq!(
		outcome.changes,
		vec![
			"Renamed `WebView` to `controls:WebView2`".to_string(),
			format!("Added `xmlns:controls=\"{WEBVIEW2_NAMESPACE}\"` to `Page`"),
		]
	);
}

#[test]
fn analyzer_failures_become_internal_diagnostics() {
	let text = "<Label><Label.Content>Hi</Label.Content></Label>";
	let context = AnalysisContext::new(text).with_project_type("uwp");
	let diagnostics = AnalyzerRegistry::with_defaults().analyze(&context, None);
	let Some(failure) = diagnostics.iter().find(|d| d.code == "XG106") else {
		panic!("expected an XG106 diagnostic");
	};

	assert!(failure.internal);
	assert_eq!(failure.severity, Severity::Hidden);
	assert!(!failure.is_shown_by_default());
	assert!(failure.message.starts_with("analyzer failed:"));
}

struct AlwaysFails;

impl ElementAnalyzer for AlwaysFails {
	fn code(&self) -> &'static str {
		"TEST001"
	}

	fn title(&self) -> &'static str {
		"Always fails"
	}

	fn element(&self) -> ElementFilter {
		ElementFilter::named("Button")
	}

	fn analyze(
		&self,
		_element: &Element,
		_context: &AnalysisContext<'_>,
	) -> Result<Option<Finding>, AnalyzerFailure> {
		Err(AnalyzerFailure("boom".to_string()))
	}
}

#[test]
fn custom_analyzers_can_be_registered() {
	let mut registry = AnalyzerRegistry::new();
	registry.register(AlwaysFails);

	let diagnostics = registry.analyze(
		&AnalysisContext::new("<Page><Button /><Button /></Page>"),
		None,
	);

	assert_eq!(diagnostics.len(), 2);
	assert!(diagnostics.iter().all(|d| d.internal && !d.is_error()));
	assert_eq!(diagnostics[0].message, "analyzer failed: boom");
}

#[test]
fn scan_issues_are_hidden_internal_diagnostics() {
	let text = "<Page>\n  <Grid>\n</Page>";
	let diagnostics = AnalyzerRegistry::with_defaults().analyze(&AnalysisContext::new(text), None);

	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0].code, SCAN_ISSUE_CODE);
	assert!(diagnostics[0].internal);
	assert_eq!(diagnostics[0].severity, Severity::Hidden);
	assert_eq!((diagnostics[0].line, diagnostics[0].column), (2, 3));
	assert_eq!(diagnostics[0].message, "element `Grid` at byte 9 is never closed");
}

#[rstest]
#[case("error", Severity::Error)]
#[case(" Warning ", Severity::Warning)]
#[case("info", Severity::Suggestion)]
#[case("none", Severity::Hidden)]
fn parses_severities(#[case] input: &str, #[case] expected: Severity) {
	assert_eq!(input.parse::<Severity>(), Ok(expected));
}

// Severity overrides

#[test]
fn severity_overrides_refresh_when_the_file_changes() -> XgenResult<()> {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join(SETTINGS_FILE_NAME);
	let overrides = SeverityOverrides::new();

	assert_eq!(
		overrides.severity(&path, "XG101", Severity::Suggestion),
		Severity::Suggestion
	);
	assert!(overrides.is_empty());

	write_file(&path, r#"{ "XG101": "error" }"#);
	assert_eq!(
		overrides.severity(&path, "xg101", Severity::Suggestion),
		Severity::Error
	);
	assert_eq!(
		overrides.severity(&path, "XG102", Severity::Warning),
		Severity::Warning
	);
	assert_eq!(overrides.len(), 1);

	write_file(&path, r#"{ "XG101": "hidden", "XG102": "error" }"#);
	assert_eq!(
		overrides.severity(&path, "XG101", Severity::Suggestion),
		Severity::Hidden
	);
	assert_eq!(
		overrides.severity(&path, "XG102", Severity::Warning),
		Severity::Error
	);

	overrides.invalidate(&path);
	assert!(overrides.is_empty());

	Ok(())
}

#[test]
#[traced_test]
fn invalid_severity_overrides_use_defaults() -> XgenResult<()> {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join(SETTINGS_FILE_NAME);
	write_file(&path, "{ not json");

	let overrides = SeverityOverrides::new();
	assert_eq!(
		overrides.severity(&path, "XG101", Severity::Suggestion),
		Severity::Suggestion
	);
	assert!(overrides.is_empty());
	assert!(logs_contain("ignoring invalid severity overrides"));

	Ok(())
}

#[test]
fn settings_file_is_found_in_ancestors() -> XgenResult<()> {
	let tmp = tempfile::tempdir()?;
	let settings = tmp.path().join(SETTINGS_FILE_NAME);
	write_file(&settings, r#"{ "XG101": "hidden" }"#);
	let nested = tmp.path().join("Views/Controls");
	std::fs::create_dir_all(&nested)?;

	assert_eq!(find_settings_file(&nested), Some(settings));

	let file = nested.join("Page.xaml");
	let context = AnalysisContext::new(MAIN_PAGE).with_file(&file);
	let overrides = SeverityOverrides::new();
	let diagnostics = AnalyzerRegistry::with_defaults().analyze(&context, Some(&overrides));

	assert_eq!(diagnostics[0].code, "XG101");
	assert_eq!(diagnostics[0].severity, Severity::Hidden);

	// Hidden diagnostics contribute no fixes.
	let outcome = AnalyzerRegistry::with_defaults().fix_document(&context, Some(&overrides));
	assert!(outcome.text.contains("<TextBox Text=\"{x:Bind Name}\" />"));
	assert!(outcome.text.contains("<controls:WebView2"));

	Ok(())
}

// Project scanning

#[test]
fn collects_markup_files() -> XgenResult<()> {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path();
	write_file(&root.join(".gitignore"), "ignored/\n");
	write_file(&root.join("App.xaml"), "<Application />");
	write_file(&root.join("ignored/Old.xaml"), "<Page />");
	write_file(&root.join("obj/Generated.xaml"), "<Page />");
	write_file(&root.join(".vs/Cache.xaml"), "<Page />");
	write_file(&root.join("Views/Main.xaml"), "<Page />");
	write_file(&root.join("Views/readme.md"), "# Views");
	write_file(&root.join("Library/xgen.toml"), "");
	write_file(&root.join("Library/Theme.xaml"), "<ResourceDictionary />");
	write_file(&root.join("Views/Widgets/.xgen.toml"), "");
	write_file(&root.join("Views/Widgets/Card.xaml"), "<UserControl />");

	let relative = |files: Vec<std::path::PathBuf>| -> Vec<String> {
		files
			.iter()
			.map(|file| {
				file.strip_prefix(root)
					.unwrap_or(file)
					.to_string_lossy()
					.replace('\\', "/")
			})
			.collect()
	};

	let files = collect_markup_files(root, &ScanOptions::default())?;
	assert_eq!(relative(files), vec!["App.xaml", "Views/Main.xaml"]);

	let without_gitignore = ScanOptions {
		disable_gitignore: true,
		..ScanOptions::default()
	};
	let files = collect_markup_files(root, &without_gitignore)?;
	assert_eq!(
		relative(files),
		vec!["App.xaml", "Views/Main.xaml", "ignored/Old.xaml"]
	);

	let tiny = ScanOptions {
		max_file_size: 8,
		..ScanOptions::default()
	};
	let files = collect_markup_files(root, &tiny)?;
	assert_eq!(relative(files), vec!["Views/Main.xaml"]);

	Ok(())
}

#[test]
fn scan_options_from_config() -> XgenResult<()> {
	let config = XgenConfig::parse("[analysis]\ninclude = [\"**/*.axaml\"]\nexclude = [\"tmp/\"]\n")?;
	let options = ScanOptions::from_config(Some(&config))?;

	assert!(options.include_set.is_match("Views/Main.axaml"));
	assert!(!options.include_set.is_match("Views/Main.xaml"));
	assert_eq!(options.exclude_patterns, vec!["tmp/"]);

	let invalid = XgenConfig::parse("[analysis]\ninclude = [\"[\"]\n")?;
	assert!(matches!(
		ScanOptions::from_config(Some(&invalid)),
		Err(XgenError::InvalidPattern { .. })
	));

	Ok(())
}

#[test]
fn computes_and_writes_project_fixes() -> XgenResult<()> {
	let tmp = tempfile::tempdir()?;
	let page = tmp.path().join("Views/Main.xaml");
	write_file(&page, MAIN_PAGE);
	write_file(&tmp.path().join("Views/Clean.xaml"), "<Page />\n");

	let registry = AnalyzerRegistry::with_defaults();
	let overrides = SeverityOverrides::new();
	let options = ScanOptions::default();

	let results = analyze_project(tmp.path(), &options, &registry, None, &overrides)?;
	let counts: Vec<usize> = results.iter().map(|r| r.diagnostics.len()).collect();
	assert_eq!(counts, vec![0, 2]);

	let fixes = compute_fixes(tmp.path(), &options, &registry, None, &overrides)?;
	assert_eq!(fixes.len(), 1);
	assert_eq!(fixes[0].file, page);
	assert_eq!(fixes[0].changes.len(), 3);

	write_fixes(&fixes)?;
	assert_eq!(std::fs::read_to_string(&page)?, fixes[0].updated);
	assert!(compute_fixes(tmp.path(), &options, &registry, None, &overrides)?.is_empty());

	Ok(())
}
