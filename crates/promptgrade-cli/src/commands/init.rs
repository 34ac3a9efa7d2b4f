//! The `promptgrade init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("promptgrade.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("exercises")?;
    write_if_missing(Path::new("exercises/example.toml"), EXAMPLE_CATALOG)?;
    write_if_missing(Path::new("submissions.toml"), EXAMPLE_SUBMISSIONS)?;

    println!("\nNext steps:");
    println!("  1. Run: promptgrade validate --catalog exercises");
    println!("  2. Run: promptgrade evaluate --catalog exercises --exercise explain-photosynthesis --text \"...\"");
    println!("  3. Run: promptgrade batch --catalog exercises --submissions submissions.toml");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# promptgrade scoring configuration
# Every key is optional; omitted keys keep their defaults.

[weights]
keyword = 0.15
pattern = 0.15
fuzzy = 0.25
relevance = 0.15
clarity = 0.10
creativity = 0.10
persuasiveness = 0.10
token = 0.05

[thresholds]
run = 0.55
submit = 0.70

[feedback]
max_hints = 3

# max_input_chars = 20000
"#;

const EXAMPLE_CATALOG: &str = r#"[catalog]
id = "example"
name = "Example Exercises"
description = "A small catalog to get started"

[[exercises]]
id = "explain-photosynthesis"
title = "Explain photosynthesis"
description = "Write a prompt that gets a clear, step-by-step explanation of photosynthesis."
difficulty = "Easy"
category = "Education"
technique = "Zero-shot"
scenario = "You are preparing revision notes for a biology class."
expected_output = "Explain how plants use sunlight, water and carbon dioxide to make glucose and release oxygen, step by step."
keywords = ["sunlight", "water", "carbon dioxide", "glucose", "oxygen"]
patterns = ["step[- ]by[- ]step", "chlorophyll"]
max_tokens = 60
hints = [
    "Ask for the inputs and outputs of the process",
    "Request a step-by-step structure",
    "Mention chlorophyll",
    "Set the audience level",
]

[exercises.ai_eval_metrics]
relevance = 0.4
clarity = 0.4
creativity = 0.2

[exercises.ai_eval_criteria]
relevance = "Covers the inputs and outputs of photosynthesis"
clarity = "Asks for an ordered explanation"
creativity = "Frames the task for the audience"

[[exercises]]
id = "pitch-product"
title = "Product pitch"
description = "Write a prompt for a persuasive two-sentence product pitch."
difficulty = "Medium"
category = "Marketing"
technique = "Role prompting"
type = "competition"
expected_output = "Act as a marketer and write a powerful, persuasive pitch for a reusable water bottle."
keywords = ["marketer", "pitch", "persuasive"]
patterns = ["act as", "bottle"]
max_tokens = 40
hints = ["Give the model a role", "Name the product"]
"#;

const EXAMPLE_SUBMISSIONS: &str = r#"[[submissions]]
exercise_id = "explain-photosynthesis"
text = "Explain photosynthesis."

[[submissions]]
exercise_id = "explain-photosynthesis"
mode = "submit"
text = "Explain step by step how plants use sunlight, water and carbon dioxide with chlorophyll to make glucose and oxygen."

[[submissions]]
exercise_id = "pitch-product"
mode = "submit"
text = "Act as a marketer. You must write a powerful, persuasive and effective pitch for a reusable water bottle. Imagine a unique, creative vision."
"#;
