use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn xgen_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("xgen"));
	cmd.env("NO_COLOR", "1").env_remove("XGEN_LOG");
	cmd
}
