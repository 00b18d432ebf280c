use vergen_gitcl::{Cargo, Emitter, Gitcl};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cargo = Cargo::builder().build();
    let gitcl = Gitcl::builder().sha(true).dirty(true).build();

    // Outside a git checkout gitcl emits default values and warnings; the
    // version string then omits the commit.
    Emitter::default()
        .add_instructions(&cargo)?
        .add_instructions(&gitcl)?
        .emit()?;

    Ok(())
}
