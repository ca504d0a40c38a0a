use vergen::Emitter;
use vergen_git2::Git2Builder;

// Only the describe string is surfaced, through `parley --version`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Git2Builder::default().describe(true, true, None).build() {
        Ok(git) => {
            Emitter::default().add_instructions(&git)?.emit()?;
        }
        // Source tarballs carry no repository.
        Err(_) => println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown"),
    }
    Ok(())
}
