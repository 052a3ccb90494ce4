//! Fixed reply texts. The bot speaks Russian, like the weather source (`lang=ru`).

pub const GREETING: &str = "Привет! Я бот, который предоставляет информацию о любом городе России.\n\
     Напишите /info для вывода всех команд или выберите одну из команд ниже.";

pub const BUTTON_CITY: &str = "Получить информацию о городе";
pub const BUTTON_LAST_CITY: &str = "Недавний город";

pub const ASK_CITY: &str = "Введите название города:";

pub const NO_LAST_CITY: &str = "Информация о последнем городе отсутствует.";

pub const HELP: &str = "/start - Приветствие и краткая информация о боте.\n\
     /city - Запросить информацию о городе (необходимо ввести название города).\n\
     /last_city - Узнать информацию о последнем введенном городе.\n\
     /info - Получить список всех команд и их описание.";
