use vergen::{BuildBuilder, Emitter};
use vergen_git2::Git2Builder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_date(true).build()?;

    // Source tarballs have no repository; fall back to placeholders so the
    // version string still renders.
    match Git2Builder::default().describe(true, true, None).sha(true).build() {
        Ok(git2) => {
            Emitter::default()
                .add_instructions(&build)?
                .add_instructions(&git2)?
                .emit()?;
        }
        Err(_) => {
            println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
            Emitter::default().add_instructions(&build)?.emit()?;
        }
    }

    Ok(())
}
