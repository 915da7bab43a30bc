use crate::Accessibility;
use crate::Mapping;
use crate::MemberDescriptor;
use crate::Profile;
use crate::ProfileSet;

/// The shipped profiles. Panics if they fail to load.
pub fn default_profiles() -> ProfileSet {
	ProfileSet::defaults().unwrap_or_else(|e| panic!("default profiles: {e}"))
}

pub fn default_profile(name: &str) -> Profile {
	default_profiles()
		.get(name)
		.cloned()
		.unwrap_or_else(|| panic!("missing default profile `{name}`"))
}

/// A profile whose templates name the mapping that produced them, so
/// resolution order can be asserted directly.
pub fn resolver_profile() -> Profile {
	Profile::new("Resolver", "FALLBACK")
		.with_mapping(Mapping::new("string", false, "PASSWORD").with_name_contains(["password"]))
		.with_mapping(Mapping::new("string", false, "STRING_RW"))
		.with_mapping(Mapping::new("string", true, "STRING_RO"))
		.with_mapping(Mapping::new("int", false, "INT_RW"))
		.with_mapping(Mapping::new("ObservableCollection<T>", false, "COLLECTION_RW"))
		.with_mapping(Mapping::new("ObservableCollection<string>", false, "STRING_COLLECTION"))
		.with_mapping(Mapping::new("List<T>", true, "LIST_RO"))
		.with_mapping(Mapping::new("enum", false, "ENUM"))
}

/// A profile with no grouping element and a one-line fallback.
pub fn flat_profile(fallback_output: &str) -> Profile {
	Profile::new("Flat", fallback_output)
}

pub fn person_members() -> Vec<MemberDescriptor> {
	vec![
		MemberDescriptor::new("FirstName", "string", false),
		MemberDescriptor::new("Age", "int", false),
		MemberDescriptor::new("Id", "Guid", true),
		MemberDescriptor::new("Secret", "string", false).with_accessibility(Accessibility::Private),
	]
}

pub fn people_member() -> MemberDescriptor {
	MemberDescriptor::new("People", "ObservableCollection<Person>", false).with_members(vec![
		MemberDescriptor::new("Name", "string", false),
		MemberDescriptor::new("Email", "string", false),
		MemberDescriptor::new("Password", "string", false)
			.with_accessibility(Accessibility::Internal),
	])
}

pub fn status_member() -> MemberDescriptor {
	MemberDescriptor::new("Status", "OrderStatus", false).with_enum_members(["Pending", "InProgress"])
}

pub const MAIN_PAGE: &str = r#"<Page xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation">
  <StackPanel>
    <TextBox Text="{x:Bind Name}" />
    <WebView Source="https://example.com" />
  </StackPanel>
</Page>
"#;

pub const GRID_PAGE: &str = "<Grid>\n  <Grid.RowDefinitions>\n  </Grid.RowDefinitions>\n  \
                             <TextBlock Text=\"{Binding Title}\" />\n</Grid>\n";

pub const WEBVIEW2_NAMESPACE: &str = "using:Microsoft.UI.Xaml.Controls";
