// Outbound message catalog (C4). One function per event in `spec.md` §4.4,
// each a pure `&str`/fields -> `String` formatter. Copy preserved verbatim
// from the original bot's message module; no wording invented here beyond
// the two events it lacked (`registration_success`, `player_word_blacklisted`),
// written in the same register as the rest.

pub fn start_hint() -> String {
    "Для начала игры напишите слова или города".to_string()
}

pub fn registration_prompt(setting: &str, timeout: i32) -> String {
    format!(
        "Регистрация игроков в игру {setting}. Если хотите участвовать, напишите \"я\". \
Время на регистрацию {timeout} секунд"
    )
}

pub fn registration_ack(name: &str) -> String {
    format!("Игрок {name} зарегистрирован")
}

pub fn registration_conflict(name: &str) -> String {
    format!("Игрок {name}. Вы уже зарегистрированы")
}

pub fn registration_error(name: &str) -> String {
    format!("Игрок {name}. Ошибка регистрации")
}

pub fn registration_failed() -> String {
    "Для игры необходимо хотя бы 2 участника".to_string()
}

/// Not present in the original catalog (which only ever sends the
/// `player_move` prompt right after registration closes) — added so the
/// engine has an explicit "registration closed, game is starting" line.
pub fn registration_success() -> String {
    "Регистрация завершена. Если захотите узнать счет игры - напишите '!статус'".to_string()
}

pub fn player_move(user: &str, last_word: &str, timeout: i32) -> String {
    format!("Ходит игрок {user}. Предыдущее слово - {last_word}. Время на ход {timeout} секунд")
}

pub fn player_timeout(user: &str) -> String {
    format!("Игрок {user} - время вышло. Вы покидаете игру")
}

pub fn player_used_word(user: &str, word: &str) -> String {
    format!("Игрок {user} - слово {word} уже называлось. Вы покидаете игру")
}

/// Original's `player_word_in_black_list`, renamed to match `spec.md`'s
/// `player_word_blacklisted` event name; wording unchanged.
pub fn player_word_blacklisted(user: &str, word: &str) -> String {
    format!("Игрок {user} - слова {word} не существует. Вы покидаете игру")
}

pub fn city_doesnt_exist(user: &str, word: &str) -> String {
    format!("Игрок {user} - города {word} не существует. Вы покидаете игру")
}

pub fn player_word_wrong(user: &str, word: &str, last_word: &str) -> String {
    format!(
        "Игрок {user} - слово {word} не начинается на последнюю букву предыдущего слова {last_word}.\
Вы покидаете игру"
    )
}

pub fn game_finished(winner: Option<&str>) -> String {
    match winner {
        Some(name) => format!("Игра завершена. Победитель - {name}"),
        None => "Игра завершена.".to_string(),
    }
}

pub fn status_init() -> String {
    "Игра еще не началась. Для начала регистрации напишите слова или города".to_string()
}

pub fn status_registration(players: &[(i32, &str)]) -> String {
    let mut msg = "Идет регистрация. Зарегистрированы следующие игроки\n".to_string();
    msg.push_str(
        &players
            .iter()
            .map(|(n, name)| format!("{n}. {name}"))
            .collect::<Vec<_>>()
            .join(" "),
    );
    msg
}

pub fn status_scoreboard(players: &[(i32, &str, i32)]) -> String {
    let mut msg = "Счет игры: ".to_string();
    msg.push_str(
        &players
            .iter()
            .map(|(n, name, score)| format!("{n}. {name}: {score}"))
            .collect::<Vec<_>>()
            .join(" "),
    );
    msg
}

pub fn vote_ack(name: &str) -> String {
    format!("Игрок {name} проголосовал")
}

pub fn vote_conflict(name: &str) -> String {
    format!("Игрок {name}. Вы уже голосовали")
}

pub fn vote_prompt(word: &str, timeout: i32) -> String {
    format!(
        "Неизвестное слово {word}, голосование продлится {timeout} секунд если вы считаете, \
что оно существует, напишите 'Да', если не существует - 'Нет' "
    )
}

pub fn vote_result(word: &str, result: bool) -> String {
    let result_str = if result { "существует" } else { "не существует" };
    format!("Голосование окончено. Слово {word} {result_str}")
}

pub fn vote_self(name: &str) -> String {
    format!("Игрок {name}. Вы не можете голосовать за свое слово")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_finished_with_and_without_winner() {
        assert_eq!(game_finished(Some("Аня")), "Игра завершена. Победитель - Аня");
        assert_eq!(game_finished(None), "Игра завершена.");
    }

    #[test]
    fn status_registration_joins_numbered_players() {
        let players = [(1, "Аня"), (2, "Боря")];
        assert_eq!(
            status_registration(&players),
            "Идет регистрация. Зарегистрированы следующие игроки\n1. Аня 2. Боря"
        );
    }

    #[test]
    fn status_scoreboard_joins_numbered_scores() {
        let players = [(1, "Аня", 3), (2, "Боря", 1)];
        assert_eq!(status_scoreboard(&players), "Счет игры: 1. Аня: 3 2. Боря: 1");
    }

    #[test]
    fn vote_result_picks_correct_suffix() {
        assert_eq!(vote_result("глина", true), "Голосование окончено. Слово глина существует");
        assert_eq!(
            vote_result("глина", false),
            "Голосование окончено. Слово глина не существует"
        );
    }
}
