pub const GENERATION: &str = include_str!("../data/prompts/generation.txt");
pub const STYLING: &str = include_str!("../data/prompts/styling.txt");
pub const VISION: &str = include_str!("../data/prompts/vision.txt");
pub const EXPLAINER: &str = include_str!("../data/prompts/explainer.txt");
pub const LAB: &str = include_str!("../data/prompts/lab.txt");
pub const MATH: &str = include_str!("../data/prompts/math.txt");
pub const ARDUINO: &str = include_str!("../data/prompts/arduino.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
