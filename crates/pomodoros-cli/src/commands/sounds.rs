use pomodoros_core::Sound;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let sounds: Vec<String> = Sound::catalogue().into_iter().map(String::from).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&sounds)?);
    } else {
        for sound in sounds {
            println!("{sound}");
        }
    }
    Ok(())
}
